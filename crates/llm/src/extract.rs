//! Helpers that pull the useful span out of a free-form oracle response.

use once_cell::sync::Lazy;
use regex::Regex;

// `(?s)` so the pattern body may span lines inside the fence.
static FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:regex)?\s*(.+?)\s*```").unwrap());

/// Trim an oracle response to the `rule … }` span. Responses often wrap the
/// rule in prose; when no rule block is found the trimmed text is returned
/// as-is so the unacceptable-response check still sees it.
pub fn rule_block(response: &str) -> String {
    let start = response.find("rule ");
    let end = response.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if e >= s => response[s..=e].trim().to_string(),
        _ => response.trim().to_string(),
    }
}

/// Extract a regex pattern from a fenced code block in the response.
pub fn fenced_pattern(response: &str) -> Option<String> {
    FENCED
        .captures(response)
        .map(|c| c[1].trim().to_string())
        .filter(|p| !p.is_empty())
}
