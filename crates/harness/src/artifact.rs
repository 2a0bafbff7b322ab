//! Result artifact - the child process's self-report, read after it exits

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::HarnessResult;

/// Verdict the child reports about its own scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildVerdict {
    Success,
    Failure,
    Error,
    Skip,
}

impl ChildVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildVerdict::Success => "success",
            ChildVerdict::Failure => "failure",
            ChildVerdict::Error => "error",
            ChildVerdict::Skip => "skip",
        }
    }
}

/// The structured result file the child writes on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultArtifact {
    pub verdict: ChildVerdict,

    #[serde(default)]
    pub message: Option<String>,

    /// How many assertions ran inside the child process.
    #[serde(default)]
    pub assertions: u32,
}

/// What we found at the export path after the child terminated.
///
/// `Missing` and `Malformed` are expected, classifiable conditions, not
/// errors: a crashed child never gets to write its report. They are distinct
/// from a `failure` verdict, which is the child telling us something.
#[derive(Debug, Clone)]
pub enum ArtifactState {
    Present(ResultArtifact),
    Missing { path: PathBuf },
    Malformed { raw: String },
}

impl ArtifactState {
    /// Read and parse the export file. Must only be called after the
    /// launcher reports termination; reading while the child still runs is
    /// a race.
    ///
    /// Absence and unparsable content both return `Ok` variants. Only I/O
    /// failures other than not-found (permissions, for instance) propagate.
    pub fn read(path: &Path) -> HarnessResult<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No result file at {}", path.display());
                return Ok(ArtifactState::Missing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<ResultArtifact>(&raw) {
            Ok(artifact) => Ok(ArtifactState::Present(artifact)),
            Err(e) => {
                debug!("Result file at {} did not parse: {}", path.display(), e);
                Ok(ArtifactState::Malformed { raw })
            }
        }
    }
}

/// Remove a file, treating "already gone" as success.
pub fn remove_idempotent(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_present_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        std::fs::write(&path, r#"{"verdict":"success","assertions":3}"#).unwrap();

        match ArtifactState::read(&path).unwrap() {
            ArtifactState::Present(artifact) => {
                assert_eq!(artifact.verdict, ChildVerdict::Success);
                assert_eq!(artifact.assertions, 3);
                assert!(artifact.message.is_none());
            }
            other => panic!("expected Present, got {:?}", other),
        }
    }

    #[test]
    fn test_read_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.json");

        match ArtifactState::read(&path).unwrap() {
            ArtifactState::Missing { path: reported } => assert_eq!(reported, path),
            other => panic!("expected Missing, got {:?}", other),
        }
    }

    #[test]
    fn test_read_malformed_artifact_keeps_raw_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        std::fs::write(&path, "not json at all").unwrap();

        match ArtifactState::read(&path).unwrap() {
            ArtifactState::Malformed { raw } => assert_eq!(raw, "not json at all"),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_verdict_tag_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        std::fs::write(&path, r#"{"verdict":"maybe","assertions":0}"#).unwrap();

        assert!(matches!(
            ArtifactState::read(&path).unwrap(),
            ArtifactState::Malformed { .. }
        ));
    }

    #[test]
    fn test_remove_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        std::fs::write(&path, "x").unwrap();

        remove_idempotent(&path).unwrap();
        assert!(!path.exists());
        // second removal of a nonexistent file is defined as success
        remove_idempotent(&path).unwrap();
    }
}
