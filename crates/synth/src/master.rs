//! Master-rule aggregation: accepted regex patterns accumulate in a batch
//! that flushes into a timestamp-and-sequence-named rule file once it
//! reaches capacity. A flushed file is never re-opened by this engine.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};
use yarsmith_llm::Oracle;

use crate::error::SynthError;

pub struct MasterRuleBatch {
    patterns: Vec<String>,
    capacity: usize,
    seq: usize,
    author_name: String,
    out_dir: PathBuf,
}

impl MasterRuleBatch {
    pub fn new(capacity: usize, author_name: impl Into<String>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            patterns: Vec::new(),
            capacity,
            seq: 1,
            author_name: author_name.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Append an accepted pattern. When the batch reaches capacity this
    /// flushes exactly once and resets the batch; the written file path is
    /// returned. A batch that never fills is carried in memory only and
    /// lost at process exit.
    pub async fn push(
        &mut self,
        pattern: String,
        oracle: &Oracle,
    ) -> Result<Option<PathBuf>, SynthError> {
        self.patterns.push(pattern);
        if self.patterns.len() < self.capacity {
            return Ok(None);
        }
        let path = self.flush(oracle).await?;
        Ok(path)
    }

    async fn flush(&mut self, oracle: &Oracle) -> Result<Option<PathBuf>, SynthError> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let file_name = format!("master_regex_rule_{}_{}.yar", timestamp, self.seq);
        let rule_name = format!("MasterRegexRule_{}_{}", timestamp, self.seq);
        let draft = self.draft(&rule_name);

        info!(file = %file_name, patterns = self.patterns.len(), "requesting master rule revision");
        let prompt = revision_prompt(&self.author_name, &draft);

        // The original generation of patterns is spent either way: a batch
        // whose revision fails is dropped, and the sequence number still
        // advances so a later flush can never collide with it.
        let written = match oracle.generate(&prompt).await {
            Some(response) => {
                let path = self.out_dir.join(&file_name);
                fs::write(&path, response.trim())?;
                info!(
                    path = %path.display(),
                    patterns = self.patterns.len(),
                    "master regex rule written"
                );
                Some(path)
            }
            None => {
                warn!(patterns = self.patterns.len(), "no usable revision response, batch dropped");
                None
            }
        };

        self.seq += 1;
        self.patterns.clear();
        Ok(written)
    }

    /// Initial draft embedding every batched pattern as a named regex
    /// string under an "any of them" condition.
    fn draft(&self, rule_name: &str) -> String {
        let mut content = format!("rule {} {{\nstrings:\n", rule_name);
        for (i, pattern) in self.patterns.iter().enumerate() {
            content.push_str(&format!("    $regex{} = /{}/\n", i, pattern));
        }
        content.push_str("condition:\n    any of them\n}");
        content
    }
}

fn revision_prompt(author_name: &str, draft: &str) -> String {
    format!(
        "Please revise the rule and suggest an improved version. Ensure that meta-data fields, \
         including the author name ({author_name}), date, and version 1.0, are included within \
         the YARA rule. Set a description meta-data based on an educated guess of the threat \
         that the specific regex patterns may be targeting. You can also use a better rule name, \
         but keep the timestamp and sequence number. Do not use fullword and output only the \
         YARA rule. No explanation.\n\n{draft}"
    )
}
