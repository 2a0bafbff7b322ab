//! Scoped temp staging - ephemeral files that cannot outlive their scope

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// A temp file holding caller-supplied content, removed when dropped.
///
/// The path may be lent out (to the launcher, to the child's environment) but
/// must never be retained past the owning value's lifetime: once this drops,
/// the file is gone.
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Create a staged file with the given content.
    ///
    /// `prefix` should carry enough identity (test class + method) to make
    /// the path recognizable in logs; uniqueness across parallel runs comes
    /// from the random infix tempfile inserts between prefix and suffix.
    /// On write failure the partially-created file is removed before the
    /// error returns.
    pub fn stage(prefix: &str, suffix: &str, content: &str) -> HarnessResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", prefix))
            .suffix(suffix)
            .tempfile()
            .map_err(|e| HarnessError::Staging(format!("failed to create temp file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| HarnessError::Staging(format!("failed to write temp file: {}", e)))?;
        file.flush()
            .map_err(|e| HarnessError::Staging(format!("failed to flush temp file: {}", e)))?;

        debug!("Staged {} byte(s) at {}", content.len(), file.path().display());

        Ok(Self { file })
    }

    /// Path of the staged file, valid only while this value lives.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Stage a batch of files. If any creation fails, the files already staged
/// are dropped (and therefore removed) before the error propagates.
pub fn stage_all(files: &[(&str, &str, &str)]) -> HarnessResult<Vec<StagedFile>> {
    let mut staged = Vec::with_capacity(files.len());
    for (prefix, suffix, content) in files {
        staged.push(StagedFile::stage(prefix, suffix, content)?);
    }
    Ok(staged)
}
