//! Error types for the harness

use thiserror::Error;

/// Result type alias using the harness error
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Errors the harness itself can hit while orchestrating a run.
///
/// Conditions caused by the child's behavior (wrong verdict, missing result
/// file, timeout) are not errors; they are classified into a [`crate::Verdict`]
/// and reported through the caller's own assertion mechanism.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to launch application: {0}")]
    Launch(String),

    #[error("Staging error: {0}")]
    Staging(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Application reported an error: {0}")]
    ChildReportedError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
