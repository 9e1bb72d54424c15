//! Physical routing of a rule file into an output bucket.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use yarsmith_core::config::CurateConfig;

use crate::error::CurateError;

pub struct Router<'a> {
    corpus_root: &'a Path,
    copy_mode: bool,
    silent_mode: bool,
}

impl<'a> Router<'a> {
    pub fn new(corpus_root: &'a Path, config: &CurateConfig) -> Self {
        Self {
            corpus_root,
            copy_mode: config.copy_mode,
            silent_mode: config.silent_mode,
        }
    }

    /// Copy or move `path` into `<corpus_root>/<bucket>/`, creating the
    /// bucket on demand. In silent mode the decision is logged but the
    /// filesystem is left untouched.
    pub fn send_to(&self, path: &Path, bucket: &str) -> Result<PathBuf, CurateError> {
        let target_folder = self.corpus_root.join(bucket);
        let file_name = path.file_name().unwrap_or_default();
        let target = target_folder.join(file_name);

        let action = if self.copy_mode { "copying" } else { "moving" };
        info!(
            from = %path.display(),
            to = %target.display(),
            action,
            silent = self.silent_mode,
            "routing rule"
        );

        if self.silent_mode {
            return Ok(target);
        }

        fs::create_dir_all(&target_folder)?;
        if self.copy_mode {
            fs::copy(path, &target)?;
        } else {
            fs::rename(path, &target)?;
        }
        Ok(target)
    }
}
