//! Assertion reconciler - folds the child's internally-counted assertions
//! into the calling test framework's own tally

use tracing::debug;

use crate::artifact::{ArtifactState, ChildVerdict};
use crate::classify::{Classification, Verdict};
use crate::error::{HarnessError, HarnessResult};

/// Seam between the out-of-process run and the caller's in-process
/// assertion-counting convention. The enclosing test framework implements
/// this; the harness only emits signals through it.
pub trait AssertionSink {
    /// One assertion passed inside the child process.
    fn assertion_passed(&mut self);

    /// The run (or an assertion inside the child) failed.
    fn test_failed(&mut self, message: &str);

    /// The child asked for the calling test to be skipped.
    fn test_skipped(&mut self, message: &str);
}

/// Counting sink, useful when no real test framework is attached.
#[derive(Debug, Clone, Default)]
pub struct TallySink {
    pub passed: u32,
    pub failures: Vec<String>,
    pub skips: Vec<String>,
}

impl AssertionSink for TallySink {
    fn assertion_passed(&mut self) {
        self.passed += 1;
    }

    fn test_failed(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }

    fn test_skipped(&mut self, message: &str) {
        self.skips.push(message.to_string());
    }
}

/// Fold a classified run into the caller's assertion tally.
///
/// A non-matched classification becomes one failure carrying the
/// classifier's message. A matched run replays the child's N assertions as
/// N pass signals, except when the artifact itself says `error` (re-raised
/// as [`HarnessError::ChildReportedError`] with the child's message
/// verbatim) or `skip` (the calling test is marked skipped).
pub fn reconcile(
    classification: &Classification,
    artifact: &ArtifactState,
    sink: &mut impl AssertionSink,
) -> HarnessResult<()> {
    if classification.verdict != Verdict::MatchedExpectation {
        sink.test_failed(&classification.message);
        return Ok(());
    }

    let artifact = match artifact {
        ArtifactState::Present(artifact) => artifact,
        // matched without a usable artifact only happens via the
        // accept-any-result escape hatch; count the run as one pass
        _ => {
            sink.assertion_passed();
            return Ok(());
        }
    };

    match artifact.verdict {
        ChildVerdict::Error => {
            let message = artifact
                .message
                .clone()
                .unwrap_or_else(|| "child reported an error with no message".to_string());
            Err(HarnessError::ChildReportedError(message))
        }
        ChildVerdict::Skip => {
            sink.test_skipped(artifact.message.as_deref().unwrap_or("skipped by child"));
            Ok(())
        }
        ChildVerdict::Failure => {
            sink.test_failed(
                artifact
                    .message
                    .as_deref()
                    .unwrap_or("child reported failure with no message"),
            );
            Ok(())
        }
        ChildVerdict::Success => {
            debug!("Replaying {} child assertion(s)", artifact.assertions);
            for _ in 0..artifact.assertions {
                sink.assertion_passed();
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ResultArtifact;
    use std::path::PathBuf;

    fn matched() -> Classification {
        Classification {
            verdict: Verdict::MatchedExpectation,
            message: "run matched expectations".to_string(),
        }
    }

    fn present(verdict: ChildVerdict, message: Option<&str>, assertions: u32) -> ArtifactState {
        ArtifactState::Present(ResultArtifact {
            verdict,
            message: message.map(String::from),
            assertions,
        })
    }

    #[test]
    fn test_success_replays_assertion_count() {
        let mut sink = TallySink::default();
        reconcile(
            &matched(),
            &present(ChildVerdict::Success, None, 3),
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.passed, 3);
        assert!(sink.failures.is_empty());
        assert!(sink.skips.is_empty());
    }

    #[test]
    fn test_error_verdict_is_reraised_verbatim() {
        let mut sink = TallySink::default();
        let result = reconcile(
            &matched(),
            &present(ChildVerdict::Error, Some("undefined method 'foo'"), 0),
            &mut sink,
        );

        match result {
            Err(HarnessError::ChildReportedError(message)) => {
                assert_eq!(message, "undefined method 'foo'")
            }
            other => panic!("expected ChildReportedError, got {:?}", other),
        }
    }

    #[test]
    fn test_skip_verdict_marks_test_skipped() {
        let mut sink = TallySink::default();
        reconcile(
            &matched(),
            &present(ChildVerdict::Skip, Some("needs a display"), 0),
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.skips, vec!["needs a display".to_string()]);
        assert_eq!(sink.passed, 0);
    }

    #[test]
    fn test_failure_verdict_fails_the_test() {
        let mut sink = TallySink::default();
        reconcile(
            &matched(),
            &present(ChildVerdict::Failure, Some("expected 2 buttons, found 1"), 4),
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.failures, vec!["expected 2 buttons, found 1".to_string()]);
        assert_eq!(sink.passed, 0);
    }

    #[test]
    fn test_non_matched_classification_becomes_one_failure() {
        let mut sink = TallySink::default();
        let classification = Classification {
            verdict: Verdict::MissingArtifact,
            message: "no result file found at /tmp/x".to_string(),
        };
        reconcile(
            &classification,
            &ArtifactState::Missing {
                path: PathBuf::from("/tmp/x"),
            },
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.failures.len(), 1);
        assert!(sink.failures[0].contains("no result file"));
    }

    #[test]
    fn test_escape_hatch_match_counts_one_pass() {
        let mut sink = TallySink::default();
        reconcile(
            &matched(),
            &ArtifactState::Missing {
                path: PathBuf::from("/tmp/x"),
            },
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.passed, 1);
    }
}
