use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match env_opt(key).as_deref() {
        Some("true") | Some("True") | Some("1") => true,
        Some(_) => false,
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Immutable configuration, built once at startup and injected into each
/// component. No component reads ambient process state after this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the rule corpus. Active rules live directly under it;
    /// output buckets are subdirectories.
    pub rules_dir: PathBuf,
    pub oracle: OracleConfig,
    pub curate: CurateConfig,
    pub synth: SynthConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            rules_dir: PathBuf::from(env_or("YARA_FOLDER", "yara-db")),
            oracle: OracleConfig::from_env(),
            curate: CurateConfig::from_env(),
            synth: SynthConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  corpus:  rules_dir={}", self.rules_dir.display());
        tracing::info!(
            "  oracle:  model={}, timeout={}s, max_queries={}, key={}",
            self.oracle.model,
            self.oracle.timeout_secs,
            self.oracle.max_queries_per_run,
            if self.oracle.api_key.is_some() { "set" } else { "(none)" },
        );
        tracing::info!(
            "  curate:  threshold={}, copy={}, silent={}, fix={}",
            self.curate.complexity_threshold,
            self.curate.copy_mode,
            self.curate.silent_mode,
            self.curate.fix_bad_rules,
        );
        tracing::info!(
            "  synth:   similarity={}, min_cluster={}, batch={}",
            self.synth.similarity_threshold,
            self.synth.min_cluster_size,
            self.synth.max_regexes_per_rule,
        );
    }
}

// ── Oracle (OpenAI-compatible chat completion) ────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Hard ceiling on oracle calls per invocation.
    pub max_queries_per_run: usize,
    /// Fixed delay between successive oracle calls, in seconds.
    pub query_delay_secs: f64,
}

impl OracleConfig {
    fn from_env() -> Self {
        Self {
            api_key: env_opt("OPENAI_API_KEY"),
            model: env_or("OPENAI_MODEL", "gpt-3.5-turbo-16k"),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com"),
            timeout_secs: env_u64("API_REQUEST_TIMEOUT", 20),
            max_queries_per_run: env_usize("MAX_QUERIES_PER_RUN", 15000),
            query_delay_secs: env_f64("DELAY_QUERY_IN_SECONDS", 0.2),
        }
    }

    /// Missing credential is the only process-fatal condition, checked
    /// once at startup before any corpus traversal.
    pub fn require_api_key(&self) -> Result<&str, CoreError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CoreError::MissingConfig("OPENAI_API_KEY not set".into()))
    }
}

// ── Curation pass ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurateConfig {
    /// Rules scoring strictly below this are weak. 0 disables the check.
    pub complexity_threshold: f64,
    pub weak_rules_folder: String,
    pub non_cve_folder: String,
    pub broken_folder: String,
    /// Prefix for per-CVE-year bucket folders, e.g. `year-2021`.
    pub year_prefix: String,
    pub yara_binary_path: PathBuf,
    /// Copy rules into buckets instead of moving them.
    pub copy_mode: bool,
    /// Log routing decisions without touching the filesystem.
    pub silent_mode: bool,
    /// Attempt one oracle-assisted repair of syntactically broken rules.
    pub fix_bad_rules: bool,
}

impl CurateConfig {
    fn from_env() -> Self {
        Self {
            complexity_threshold: env_f64("YARA_COMPLEXITY_THRESHOLD", 100.0),
            weak_rules_folder: env_or("OUTPUT_WEAK_RULES_FOLDER", "weak-rules"),
            non_cve_folder: env_or("OUTPUT_NON_CVE_FOLDER", "non-cve"),
            broken_folder: env_or("OUTPUT_BROKEN_RULES_FOLDER", "broken"),
            year_prefix: env_or("OUTPUT_CVE_YEAR_PREFIX", "year-"),
            yara_binary_path: PathBuf::from(env_or("YARA_BINARY_PATH", "yara")),
            copy_mode: env_bool("COPY_MODE", true),
            silent_mode: env_bool("SILENT_MODE", true),
            fix_bad_rules: env_bool("FIX_BAD_RULES", true),
        }
    }
}

// ── Synthesis pass ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Similarity ratio (0–1) at or above which a string joins a cluster.
    pub similarity_threshold: f64,
    /// Member count at which a cluster triggers regex synthesis.
    pub min_cluster_size: usize,
    pub small_string_max_len: usize,
    pub medium_string_max_len: usize,
    /// Batch capacity: accepted regexes per master rule.
    pub max_regexes_per_rule: usize,
    pub min_regex_length: usize,
    pub max_regex_length: usize,
    pub max_nested_quantifiers: usize,
    pub max_advanced_constructs: usize,
    pub max_escaped_characters: usize,
    pub max_classes_alternation: usize,
    /// Author string the oracle is asked to put in master-rule metadata.
    pub author_name: String,
}

impl SynthConfig {
    fn from_env() -> Self {
        Self {
            similarity_threshold: env_f64("STRING_SIMILARITY_THRESHOLD", 0.7),
            min_cluster_size: env_usize("MIN_CLUSTER_SIZE", 10),
            small_string_max_len: env_usize("SMALL_STRING_MAX_LEN", 20),
            medium_string_max_len: env_usize("MEDIUM_STRING_MAX_LEN", 100),
            max_regexes_per_rule: env_usize("MAX_REGEXES_PER_RULE", 10),
            min_regex_length: env_usize("MIN_REGEX_LENGTH", 20),
            max_regex_length: env_usize("MAX_REGEX_LENGTH", 150),
            max_nested_quantifiers: env_usize("MAX_NESTED_QUANTIFIERS", 3),
            max_advanced_constructs: env_usize("MAX_ADVANCED_CONSTRUCTS", 2),
            max_escaped_characters: env_usize("MAX_ESCAPED_CHARACTERS", 10),
            max_classes_alternation: env_usize("MAX_CLASSES_ALTERNATION", 20),
            author_name: env_or(
                "YARA_AUTHOR_NAME",
                "Generated by yarsmith and its upstream language model",
            ),
        }
    }
}
