//! Rule curation pass: score, classify and route each rule file in the
//! corpus root into exactly one output bucket, attempting one bounded
//! oracle-assisted repair of syntactically broken rules along the way.

pub mod classify;
pub mod error;
pub mod route;
pub mod validate;

use std::fs;
use std::path::Path;

use tracing::{info, warn};
use yarsmith_core::config::CurateConfig;
use yarsmith_core::rule::Rule;
use yarsmith_llm::Oracle;

use crate::classify::{classify, Outcome};
use crate::error::CurateError;
use crate::route::Router;
use crate::validate::RuleValidator;

/// Outcome counts for one routing pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub weak: usize,
    pub non_cve: usize,
    pub broken: usize,
    pub year_bucketed: usize,
    pub left_in_place: usize,
    pub skipped: usize,
}

/// Classify every `.yar` file directly under the corpus root.
///
/// Bucketed files leave the active set, so re-running the pass on an
/// already-routed corpus is a no-op. Per-file failures are logged and
/// skipped; the pass always continues to the next file.
pub async fn run_pass(
    corpus_root: &Path,
    config: &CurateConfig,
    validator: &dyn RuleValidator,
    repair_oracle: Option<&Oracle>,
) -> Result<PassSummary, CurateError> {
    if !config.silent_mode {
        for bucket in [
            &config.weak_rules_folder,
            &config.non_cve_folder,
            &config.broken_folder,
        ] {
            if let Err(e) = fs::create_dir_all(corpus_root.join(bucket)) {
                warn!(bucket = %bucket, error = %e, "failed to create bucket folder");
            }
        }
    }

    let router = Router::new(corpus_root, config);
    let mut summary = PassSummary::default();

    let mut entries: Vec<_> = fs::read_dir(corpus_root)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "yar"))
        .collect();
    entries.sort();

    for path in entries {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable rule file, skipping");
                summary.skipped += 1;
                continue;
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let rule = Rule::parse(file_name, content);

        let outcome = classify(&rule, &path, config, validator, repair_oracle).await;
        let bucket = match &outcome {
            Outcome::Weak => Some(config.weak_rules_folder.as_str()),
            Outcome::NonCve => Some(config.non_cve_folder.as_str()),
            Outcome::Broken => Some(config.broken_folder.as_str()),
            Outcome::YearBucket(bucket) => Some(bucket.as_str()),
            // Valid rules without a CVE token stay at the corpus root for
            // manual triage.
            Outcome::LeftInPlace => None,
        };
        if let Some(bucket) = bucket {
            if let Err(e) = router.send_to(&path, bucket) {
                warn!(path = %path.display(), bucket, error = %e, "failed to route rule file, skipping");
                summary.skipped += 1;
                continue;
            }
        }

        match outcome {
            Outcome::Weak => summary.weak += 1,
            Outcome::NonCve => summary.non_cve += 1,
            Outcome::Broken => summary.broken += 1,
            Outcome::YearBucket(_) => summary.year_bucketed += 1,
            Outcome::LeftInPlace => summary.left_in_place += 1,
        }
    }

    info!(
        weak = summary.weak,
        non_cve = summary.non_cve,
        broken = summary.broken,
        year_bucketed = summary.year_bucketed,
        left_in_place = summary.left_in_place,
        skipped = summary.skipped,
        "curation pass complete"
    );
    Ok(summary)
}
