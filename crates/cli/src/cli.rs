use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Curate an LLM-generated YARA rule corpus and synthesize generalized
/// regex master rules from it.
#[derive(Parser, Debug)]
#[command(name = "yarsmith", version, about)]
pub struct CliArgs {
    /// Pipeline stage to run.
    #[arg(long, value_enum)]
    pub stage: Stage,

    /// Root of the rule corpus (overrides YARA_FOLDER).
    #[arg(long)]
    pub rules_dir: Option<PathBuf>,

    /// Oracle API key (overrides OPENAI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Oracle model identifier (overrides OPENAI_MODEL).
    #[arg(long)]
    pub model: Option<String>,

    /// Oracle request timeout in seconds (overrides API_REQUEST_TIMEOUT).
    #[arg(long)]
    pub api_request_timeout: Option<u64>,

    /// Complexity threshold below which rules are weak; 0 disables
    /// (overrides YARA_COMPLEXITY_THRESHOLD).
    #[arg(long)]
    pub complexity_threshold: Option<f64>,

    /// Path to the YARA binary (overrides YARA_BINARY_PATH).
    #[arg(long)]
    pub yara_binary_path: Option<PathBuf>,

    /// Copy rules into buckets instead of moving them (overrides COPY_MODE).
    #[arg(long)]
    pub copy_mode: Option<bool>,

    /// Log routing decisions without touching files (overrides SILENT_MODE).
    #[arg(long)]
    pub silent_mode: Option<bool>,

    /// Attempt oracle-assisted repair of broken rules (overrides FIX_BAD_RULES).
    #[arg(long)]
    pub fix_bad_rules: Option<bool>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Classify and route every rule at the corpus root.
    Curate,
    /// Cluster corpus strings and synthesize master regex rules.
    Synth,
    /// Curate, then synthesize.
    All,
}

impl CliArgs {
    /// Fold CLI overrides into the env-derived config.
    pub fn apply(&self, config: &mut yarsmith_core::Config) {
        if let Some(dir) = &self.rules_dir {
            config.rules_dir = dir.clone();
        }
        if let Some(key) = &self.api_key {
            config.oracle.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.oracle.model = model.clone();
        }
        if let Some(timeout) = self.api_request_timeout {
            config.oracle.timeout_secs = timeout;
        }
        if let Some(threshold) = self.complexity_threshold {
            config.curate.complexity_threshold = threshold;
        }
        if let Some(path) = &self.yara_binary_path {
            config.curate.yara_binary_path = path.clone();
        }
        if let Some(copy) = self.copy_mode {
            config.curate.copy_mode = copy;
        }
        if let Some(silent) = self.silent_mode {
            config.curate.silent_mode = silent;
        }
        if let Some(fix) = self.fix_bad_rules {
            config.curate.fix_bad_rules = fix;
        }
    }
}
