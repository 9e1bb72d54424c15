//! Syntax validation and the bounded repair state machine.
//!
//! `Validating → {Valid, Invalid}`; an invalid rule with a repair oracle in
//! hand goes `Repairing → Validating → {Valid, RepairFailed}`. The inner
//! validation runs with no oracle, so a second repair attempt is impossible
//! by construction.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};
use yarsmith_core::accept::is_unacceptable_oracle_response;
use yarsmith_llm::{extract, Oracle};

use crate::error::CurateError;

/// Result of one validator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid { error: String },
}

/// External syntax-checker seam. The production implementation shells out
/// to the YARA binary; tests substitute deterministic fakes.
pub trait RuleValidator: Send + Sync {
    fn validate(&self, path: &Path) -> Result<Verdict, CurateError>;
}

/// Invokes the YARA binary as `<binary> <file> .` (the trailing `.` is the
/// rule include path) and maps its exit code to a [`Verdict`].
pub struct YaraBinary {
    binary: std::path::PathBuf,
}

impl YaraBinary {
    pub fn new(binary: impl Into<std::path::PathBuf>) -> Self {
        Self { binary: binary.into() }
    }
}

impl RuleValidator for YaraBinary {
    fn validate(&self, path: &Path) -> Result<Verdict, CurateError> {
        let output = Command::new(&self.binary)
            .arg(path)
            .arg(".")
            .output()
            .map_err(|e| {
                CurateError::ValidatorInvocation(format!(
                    "{}: {}",
                    self.binary.display(),
                    e
                ))
            })?;
        if output.status.success() {
            debug!(path = %path.display(), "syntax valid");
            Ok(Verdict::Valid)
        } else {
            Ok(Verdict::Invalid {
                error: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Terminal state of the validate-then-repair machine. `Broken` covers both
/// "invalid with repair not eligible" and a failed repair attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxOutcome {
    Valid,
    Broken,
}

/// Validate `path`, driving at most one oracle repair attempt.
///
/// `repair_oracle` is a capability: the inner re-validation is handed no
/// oracle, which bounds the machine to exactly one repair per rule. On a
/// successful repair the original file's contents are atomically replaced
/// with the fixed text.
pub async fn check_syntax(
    path: &Path,
    validator: &dyn RuleValidator,
    repair_oracle: Option<&Oracle>,
) -> Result<SyntaxOutcome, CurateError> {
    let error = match validator.validate(path)? {
        Verdict::Valid => return Ok(SyntaxOutcome::Valid),
        Verdict::Invalid { error } => error,
    };
    warn!(path = %path.display(), error = %error, "rule failed syntax validation");

    let oracle = match repair_oracle {
        Some(o) => o,
        None => return Ok(SyntaxOutcome::Broken),
    };

    let original = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read rule for repair");
            return Ok(SyntaxOutcome::Broken);
        }
    };

    info!(path = %path.display(), "attempting oracle-assisted repair");
    let prompt = repair_prompt(&original, &error);
    let fixed = match oracle.generate(&prompt).await {
        Some(response) => extract::rule_block(&response),
        None => return Ok(SyntaxOutcome::Broken),
    };

    // An unacceptable fix is rejected without a second validator call.
    if is_unacceptable_oracle_response(&fixed) {
        warn!(path = %path.display(), "suggested fix is insufficient");
        return Ok(SyntaxOutcome::Broken);
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .suffix(".yar.fix")
        .tempfile_in(parent)?;
    tmp.write_all(fixed.as_bytes())?;
    tmp.flush()?;

    // Re-validate with no repair capability.
    match validator.validate(tmp.path())? {
        Verdict::Valid => {
            tmp.persist(path)
                .map_err(|e| CurateError::Persist(e.to_string()))?;
            info!(path = %path.display(), "repaired rule persisted");
            Ok(SyntaxOutcome::Valid)
        }
        Verdict::Invalid { error } => {
            warn!(path = %path.display(), error = %error, "repaired rule still invalid");
            Ok(SyntaxOutcome::Broken)
        }
    }
}

fn repair_prompt(rule_content: &str, syntax_error: &str) -> String {
    format!(
        "The following YARA rule has a syntax error:\n{rule_content}\n\n\
         The syntax error is: {syntax_error}. Please fix the YARA rule. \
         If there are references to the pe module or undefined identifiers, please remove them. \
         If the rule has an incomplete CVE ID in the meta-data, please remove it. \
         In your response, please do not include anything else except the final YARA rule."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repair_prompt_embeds_rule_and_error() {
        let p = repair_prompt("rule r { condition: pe.is_dll }", "undefined identifier \"pe\"");
        assert!(p.contains("rule r { condition: pe.is_dll }"));
        assert!(p.contains("undefined identifier \"pe\""));
        assert!(p.contains("remove"));
    }
}
