//! Lightweight structural view of a YARA rule.
//!
//! This is deliberately not a grammar parser: only the named string
//! assignments and the condition clause are extracted, which is enough to
//! drive complexity scoring, classification and string clustering.

use once_cell::sync::Lazy;
use regex::Regex;

static STRING_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$\S+) = ([^\n]+)").unwrap());

// `\s` crosses newlines, `.` does not: the captured condition is the first
// non-whitespace line after the marker.
static CONDITION: Lazy<Regex> = Lazy::new(|| Regex::new(r"condition:\s*(.*)").unwrap());

// Anchored prefix matches, like the scoring heuristic expects: a value such
// as `{ 6A 40 68 } // note` still counts as a byte array.
static BYTE_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{[0-9A-Fa-f\s]+\}").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^".*""#).unwrap());

static CVE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"CVE-(\d{4})-\d+").unwrap());

/// One string assignment from a rule's `strings:` section. The value keeps
/// its surrounding quotes/braces and any trailing modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringPair {
    pub name: String,
    pub value: String,
}

/// A rule file reduced to the structure the engine needs. Names need not be
/// unique across files; insertion order is source order.
#[derive(Debug, Clone)]
pub struct Rule {
    pub file_name: String,
    pub raw: String,
    pub strings: Vec<StringPair>,
    /// Absent when no `condition:` marker was found. Callers treat this as
    /// "score 0 / not further analyzable", never as an error.
    pub condition: Option<String>,
}

impl Rule {
    pub fn parse(file_name: impl Into<String>, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let strings = STRING_ASSIGN
            .captures_iter(&raw)
            .map(|c| StringPair {
                name: c[1].to_string(),
                value: c[2].to_string(),
            })
            .collect();
        let condition = CONDITION
            .captures(&raw)
            .map(|c| c[1].trim().to_string());
        Self {
            file_name: file_name.into(),
            raw,
            strings,
            condition,
        }
    }

    /// Heuristic strength score for the rule.
    ///
    /// Byte arrays weigh 3x, quoted human-readable strings 1x, anything
    /// else (loose literals, paths) 0.5x; each contributes `len * weight`.
    /// Strings shorter than 5 characters are ignored. An "all of" condition
    /// over more than one string multiplies the total by 1.5. A missing
    /// condition scores 0. The exact arithmetic feeds a hard threshold, so
    /// weights and multiplier must not drift.
    pub fn complexity(&self) -> f64 {
        let byte_array_weight = 3.0;
        let code_snippet_weight = 1.0;
        let file_path_weight = 0.5;
        let all_of_multiplier = 1.5;

        let condition = match &self.condition {
            Some(c) => c,
            None => return 0.0,
        };

        let mut total = 0.0;
        for pair in &self.strings {
            let len = pair.value.chars().count();
            if len < 5 {
                continue;
            }
            let weight = if BYTE_ARRAY.is_match(&pair.value) {
                byte_array_weight
            } else if QUOTED.is_match(&pair.value) {
                code_snippet_weight
            } else {
                file_path_weight
            };
            total += len as f64 * weight;
        }

        if condition.contains("all of") && self.strings.len() > 1 {
            total *= all_of_multiplier;
        }

        total
    }

    /// First `CVE-YYYY-<digits>` token in the rule body, if any.
    pub fn cve_token(&self) -> Option<&str> {
        CVE_TOKEN.find(&self.raw).map(|m| m.as_str())
    }

    /// Four-digit year of the first CVE token, if any.
    pub fn cve_year(&self) -> Option<&str> {
        CVE_TOKEN
            .captures(&self.raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}
