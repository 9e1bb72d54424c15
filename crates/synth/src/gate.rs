//! Syntactic complexity gate for synthesized regex candidates.
//!
//! The gate bounds pattern complexity only; it makes no claim about
//! semantic correctness of the pattern.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use yarsmith_core::config::SynthConfig;

static QUANTIFIERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*|\+|\?|\{[\d,]+\}").unwrap());

// Lookarounds and non-capturing groups, counted per construct type.
static ADVANCED_CONSTRUCTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\(\?=.*?\)",
        r"\(\?!.*?\)",
        r"\(\?<=.*?\)",
        r"\(\?<!.*?\)",
        r"\(\?:.*?\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static ESCAPED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\.").unwrap());
static CHAR_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static ALTERNATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|").unwrap());

/// True if the candidate pattern violates any complexity bound and must be
/// rejected rather than batched.
pub fn is_too_complex(pattern: &str, config: &SynthConfig) -> bool {
    let len = pattern.chars().count();
    if len > config.max_regex_length || len < config.min_regex_length {
        debug!(len, "excluding regex, length not in threshold");
        return true;
    }

    if QUANTIFIERS.find_iter(pattern).count() > config.max_nested_quantifiers {
        debug!("excluding regex, too many quantifiers");
        return true;
    }

    for construct in ADVANCED_CONSTRUCTS.iter() {
        if construct.find_iter(pattern).count() > config.max_advanced_constructs {
            debug!("excluding regex, too many advanced constructs");
            return true;
        }
    }

    if ESCAPED.find_iter(pattern).count() > config.max_escaped_characters {
        debug!("excluding regex, too many escaped sequences");
        return true;
    }

    let classes = CHAR_CLASS.find_iter(pattern).count();
    let alternations = ALTERNATION.find_iter(pattern).count();
    if classes + alternations > config.max_classes_alternation {
        debug!("excluding regex, too many character classes and alternations");
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

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
            author_name: "test".into(),
        }
    }

    #[test]
    fn length_boundaries_are_inclusive() {
        let cfg = config();
        // One char below the minimum is rejected.
        assert!(is_too_complex(&"a".repeat(19), &cfg));
        // Exactly at the minimum is accepted.
        assert!(!is_too_complex(&"a".repeat(20), &cfg));
        assert!(!is_too_complex(&"a".repeat(150), &cfg));
        assert!(is_too_complex(&"a".repeat(151), &cfg));
    }

    #[test]
    fn quantifier_bound() {
        let cfg = config();
        // Three quantifiers: allowed.
        assert!(!is_too_complex("abc*def+ghi?jklmnopqrs", &cfg));
        // Four: rejected.
        assert!(is_too_complex("abc*def+ghi?jk{1,3}lmnopqrs", &cfg));
    }

    #[test]
    fn advanced_construct_bound_is_per_type() {
        let cfg = config();
        // Two lookaheads: within the per-type bound (and their `?`s stay
        // within the quantifier bound, which counts them too).
        assert!(!is_too_complex("(?=ef)(?=gh)abcdefgh", &cfg));
        // Three non-capturing groups exceed the per-type bound.
        assert!(is_too_complex("(?:ab)(?:cd)(?:ef)ghijklmnop", &cfg));
    }

    #[test]
    fn escaped_sequence_bound() {
        let cfg = config();
        let ok = format!("{}abcdefgh", r"\d\d\d\d\d".repeat(2)); // 10 escapes
        assert!(!is_too_complex(&ok, &cfg));
        let too_many = format!("{}abcdefgh", r"\d\d\d\d\d\d".repeat(2)); // 12 escapes
        assert!(is_too_complex(&too_many, &cfg));
    }

    #[test]
    fn class_and_alternation_bound_is_combined() {
        let mut cfg = config();
        cfg.max_classes_alternation = 3;
        assert!(!is_too_complex("[ab]x[cd]y|zaaaaaaaaaaaa", &cfg));
        assert!(is_too_complex("[ab]x[cd]y|z|waaaaaaaaaaa", &cfg));
    }
}
