//! End-to-end synthesis-pass tests with a deterministic fake oracle.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use yarsmith_core::config::SynthConfig;
use yarsmith_llm::{LlmError, LlmProvider, Message, Oracle};
use yarsmith_synth::run_pass;

/// Replies with a fenced regex for pattern prompts and a finished rule for
/// revision prompts, recording every prompt it sees.
struct ScriptedProvider {
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let prompt = messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let reply = if prompt.starts_with("Please revise the rule") {
            "rule Revised_Master_Rule { condition: true }".to_string()
        } else {
            "```regex\npayload_download_endpoint_[0-9]{2}\n```".to_string()
        };
        self.prompts.lock().unwrap().push(prompt);
        Ok(reply)
    }
}

fn oracle(prompts: Arc<Mutex<Vec<String>>>) -> Oracle {
    Oracle::new(Box::new(ScriptedProvider { prompts }), 1000, Duration::ZERO)
}

fn config() -> SynthConfig {
    SynthConfig {
        similarity_threshold: 0.7,
        min_cluster_size: 10,
        small_string_max_len: 20,
        medium_string_max_len: 100,
        max_regexes_per_rule: 10,
        min_regex_length: 20,
        max_regex_length: 150,
        max_nested_quantifiers: 3,
        max_advanced_constructs: 2,
        max_escaped_characters: 10,
        max_classes_alternation: 20,
        author_name: "tester".into(),
    }
}

/// Twelve rule files, each carrying one near-identical 30-plus-character
/// quoted string; file names sort in creation order.
fn write_corpus(root: &Path) {
    for i in 1..=12 {
        let rule = format!(
            "rule sample_{i:02} {{\nstrings:\n    $s = \"payload_download_endpoint_{i:02}\"\ncondition:\n    any of them\n}}"
        );
        fs::write(root.join(format!("r{i:02}.yar")), rule).unwrap();
    }
}

#[tokio::test]
async fn synthesis_triggers_at_the_tenth_member() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = oracle(prompts.clone());
    let summary = run_pass(dir.path(), &config(), &oracle).await.unwrap();

    assert_eq!(summary.files_processed, 12);
    // One cluster ripened, exactly once: at the tenth member, after which
    // the reset leaves only two members for the remaining files.
    assert_eq!(summary.clusters_synthesized, 1);
    assert_eq!(summary.patterns_accepted, 1);
    assert_eq!(summary.patterns_rejected, 0);

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    // The prompt carries the ten members observed so far, ending at the
    // tenth file, and none of the later ones.
    assert_eq!(prompts[0].matches("payload_download_endpoint_").count(), 10);
    assert!(prompts[0].contains("payload_download_endpoint_10"));
    assert!(!prompts[0].contains("payload_download_endpoint_11"));
}

#[tokio::test]
async fn full_batch_emits_a_master_rule() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());

    let mut cfg = config();
    cfg.max_regexes_per_rule = 1; // flush on the first accepted pattern

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = oracle(prompts.clone());
    let summary = run_pass(dir.path(), &cfg, &oracle).await.unwrap();

    assert_eq!(summary.master_rules_written, 1);
    let master: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("master_regex_rule_") && n.ends_with(".yar"))
        .collect();
    assert_eq!(master.len(), 1);
    let content = fs::read_to_string(dir.path().join(&master[0])).unwrap();
    assert_eq!(content, "rule Revised_Master_Rule { condition: true }");
}

#[tokio::test]
async fn trash_strings_never_cluster() {
    let dir = tempfile::tempdir().unwrap();
    for i in 1..=12 {
        let rule = format!(
            "rule t_{i:02} {{\nstrings:\n    $s = \"INSERT INTERESTING STRING\"\ncondition:\n    any of them\n}}"
        );
        fs::write(dir.path().join(format!("t{i:02}.yar")), rule).unwrap();
    }

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = oracle(prompts.clone());
    let summary = run_pass(dir.path(), &config(), &oracle).await.unwrap();

    assert_eq!(summary.clusters_synthesized, 0);
    assert!(prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreadable_files_are_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    fs::write(dir.path().join("binary.yar"), [0xFFu8, 0xFE, 0x00, 0x80]).unwrap();

    let prompts = Arc::new(Mutex::new(Vec::new()));
    let oracle = oracle(prompts.clone());
    let summary = run_pass(dir.path(), &config(), &oracle).await.unwrap();

    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.files_processed, 12);
}
