//! Corpus-wide synthesis pass: cluster indicator strings across the rule
//! corpus, ask the oracle for generalized regex patterns when clusters
//! ripen, gate them by syntactic complexity, and aggregate accepted
//! patterns into master rule files.

pub mod cluster;
pub mod error;
pub mod gate;
pub mod master;

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use yarsmith_core::accept::is_trash_string;
use yarsmith_core::config::SynthConfig;
use yarsmith_core::rule::Rule;
use yarsmith_llm::{extract, Oracle};

use crate::cluster::Clusters;
use crate::error::SynthError;
use crate::master::MasterRuleBatch;

/// Counters for one synthesis pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SynthSummary {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub clusters_synthesized: usize,
    pub patterns_accepted: usize,
    pub patterns_rejected: usize,
    pub master_rules_written: usize,
}

/// Walk every `.yar` file under the corpus root in traversal order and
/// drive clustering, regex synthesis and master-rule aggregation.
///
/// Clusters are transient: they live for this pass only, and any cluster
/// that triggers synthesis is reset (key kept) so later files feed its next
/// generation. Per-file and per-cluster failures are isolated and logged.
pub async fn run_pass(
    corpus_root: &Path,
    config: &SynthConfig,
    oracle: &Oracle,
) -> Result<SynthSummary, SynthError> {
    let start = Instant::now();
    let mut clusters = Clusters::new();
    let mut batch = MasterRuleBatch::new(
        config.max_regexes_per_rule,
        config.author_name.clone(),
        corpus_root,
    );
    let mut summary = SynthSummary::default();

    info!(root = %corpus_root.display(), "starting synthesis pass");

    for entry in WalkDir::new(corpus_root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "walkdir error, skipping entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "yar") {
            continue;
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable rule file, skipping");
                summary.files_skipped += 1;
                continue;
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let rule = Rule::parse(file_name, content);

        for pair in &rule.strings {
            if is_trash_string(&pair.value) {
                continue;
            }
            clusters.add(&pair.value, config);
        }
        summary.files_processed += 1;

        // Any cluster that ripened while processing this file triggers
        // synthesis immediately.
        for (category, key) in clusters.ripe(config.min_cluster_size) {
            let members = clusters
                .members(category, &key)
                .map(|m| m.to_vec())
                .unwrap_or_default();
            info!(
                category = category.label(),
                size = members.len(),
                "generating regex for ripe cluster"
            );
            summary.clusters_synthesized += 1;

            let pattern = request_pattern(&members, oracle).await;
            oracle.pace().await;

            let Some(pattern) = pattern else {
                // No extractable pattern: the cluster keeps accumulating
                // and will trigger again on the next qualifying file.
                continue;
            };
            debug!(pattern = %pattern, "synthesized regex");
            clusters.reset(category, &key);

            if gate::is_too_complex(&pattern, config) {
                info!(pattern = %pattern, "regex rejected by complexity gate");
                summary.patterns_rejected += 1;
                continue;
            }

            summary.patterns_accepted += 1;
            match batch.push(pattern, oracle).await {
                Ok(Some(path)) => {
                    summary.master_rules_written += 1;
                    oracle.pace().await;
                    debug!(path = %path.display(), "master rule flushed");
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "failed to write master rule"),
            }
        }
    }

    clusters.log_statistics();
    if !batch.is_empty() {
        // Partial batches are carried in memory only and lost at exit.
        info!(pending = batch.len(), "pass ended with a partial batch, not flushed");
    }
    info!(
        elapsed_secs = start.elapsed().as_secs_f64(),
        files = summary.files_processed,
        clusters = summary.clusters_synthesized,
        accepted = summary.patterns_accepted,
        masters = summary.master_rules_written,
        "synthesis pass complete"
    );
    Ok(summary)
}

/// One oracle round-trip for a ripe cluster; returns the fenced pattern if
/// the response carried one.
async fn request_pattern(members: &[String], oracle: &Oracle) -> Option<String> {
    let prompt = pattern_prompt(members);
    let response = oracle.generate(&prompt).await?;
    match extract::fenced_pattern(&response) {
        Some(p) => Some(p),
        None => {
            warn!("regex pattern not found in oracle response");
            None
        }
    }
}

fn pattern_prompt(members: &[String]) -> String {
    format!(
        "I need a regular expression that matches the following strings with high performance \
         optimization: {}. The regex should be concise and optimized for performance and low \
         false positive detection ratio, as it will be used in a security product. However, if \
         not possible to find a regex rule that covers all strings, it is okay to cover only \
         the majority. Please only output the regex surrounded by the regex ``` code \
         formatting. No explanation.",
        members.join(", ")
    )
}
