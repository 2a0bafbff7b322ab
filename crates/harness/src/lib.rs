//! Appspec Harness
//!
//! Out-of-process test driver for GUI applications. The harness launches the
//! application-under-test as a child process with injected configuration,
//! waits for it to run a scripted scenario, and deterministically classifies
//! the outcome by reading back a structured result artifact. The application
//! is an opaque black box: the only signals are its exit status and one JSON
//! file.
//!
//! # Architecture
//!
//! ```text
//! RunRequest
//!     │
//!     ▼
//! config::compose ──► scenario script + log routing (in memory)
//!     │
//!     ▼
//! staging ──────────► temp files, removed on every exit path
//!     │
//!     ▼
//! launcher::launch ─► child process, blocking wait, timeout-kills
//!     │
//!     ▼
//! ArtifactState::read (only after termination)
//!     │
//!     ▼
//! classify ─────────► Verdict + message
//!     │
//!     ▼
//! reconcile ────────► caller's assertion tally
//! ```

pub mod artifact;
pub mod classify;
pub mod config;
pub mod driver;
pub mod error;
pub mod launcher;
pub mod reconcile;
pub mod staging;

pub use artifact::{ArtifactState, ChildVerdict, ResultArtifact};
pub use classify::{classify, Classification, Verdict};
pub use config::{compose, ComposedRun, LogConfig, RunRequest, ScenarioSource};
pub use driver::{Driver, DriverConfig, RunReport};
pub use error::{HarnessError, HarnessResult};
pub use launcher::{launch, LaunchSpec, ProcessOutcome};
pub use reconcile::{reconcile, AssertionSink, TallySink};
pub use staging::{stage_all, StagedFile};
