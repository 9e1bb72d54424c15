//! Ordered routing policy for one rule file. First match wins.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use yarsmith_core::config::CurateConfig;
use yarsmith_core::rule::Rule;
use yarsmith_llm::Oracle;

use crate::validate::{check_syntax, RuleValidator, SyntaxOutcome};

/// Module-derived hash/behavioral identifiers that mark a rule as weak
/// regardless of its score.
const WEAK_INDICATORS: &[&str] = &["pe.imphash", "hash.sha256", "cuckoo."];

/// Matches a CVE metadata field whose year is known but whose number is a
/// placeholder, e.g. `cve_id = "CVE-2021-XXXX"`.
static CVE_NUMBER_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"cve_id = "CVE-\d+-XXXX""#).unwrap());

const CVE_UNKNOWN_MARKER: &str = r#"cve_id = "N/A""#;

/// Destination decision for one rule. `LeftInPlace` is the implicit sixth
/// outcome: syntactically valid but carrying no CVE token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Weak,
    NonCve,
    Broken,
    YearBucket(String),
    LeftInPlace,
}

/// Evaluate the routing policy in precedence order:
/// weak-by-score, weak-indicator, incomplete CVE metadata, syntax
/// validation (with bounded repair), CVE year, else left in place.
pub async fn classify(
    rule: &Rule,
    path: &Path,
    config: &CurateConfig,
    validator: &dyn RuleValidator,
    repair_oracle: Option<&Oracle>,
) -> Outcome {
    // A threshold of 0 disables the complexity check entirely.
    let threshold = config.complexity_threshold;
    let score = if threshold == 0.0 { 0.0 } else { rule.complexity() };
    if score > 0.0 && score < threshold {
        debug!(
            file = %rule.file_name,
            score,
            threshold,
            "rule below complexity threshold"
        );
        return Outcome::Weak;
    }

    if WEAK_INDICATORS.iter().any(|w| rule.raw.contains(w)) {
        debug!(file = %rule.file_name, "rule relies on weak indicators");
        return Outcome::Weak;
    }

    if rule.raw.contains(CVE_UNKNOWN_MARKER) || CVE_NUMBER_PLACEHOLDER.is_match(&rule.raw) {
        debug!(file = %rule.file_name, "rule has incomplete CVE metadata");
        return Outcome::NonCve;
    }

    match check_syntax(path, validator, repair_oracle).await {
        Ok(SyntaxOutcome::Valid) => {}
        Ok(SyntaxOutcome::Broken) => return Outcome::Broken,
        Err(e) => {
            // Validator invocation failure is indistinguishable from a
            // broken rule for routing purposes; log the real cause.
            tracing::warn!(file = %rule.file_name, error = %e, "validator invocation failed");
            return Outcome::Broken;
        }
    }

    match rule.cve_year() {
        Some(year) => Outcome::YearBucket(format!("{}{}", config.year_prefix, year)),
        None => Outcome::LeftInPlace,
    }
}
