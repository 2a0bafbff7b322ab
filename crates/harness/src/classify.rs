//! Outcome classifier - pure function from (request, exit, artifact) to verdict

use crate::artifact::ArtifactState;
use crate::config::RunRequest;
use crate::launcher::ProcessOutcome;

/// The harness's terminal judgment of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    MatchedExpectation,
    MismatchedVerdict,
    MismatchedAssertionCount,
    ProcessExitMismatch,
    MissingArtifact,
    MalformedArtifact,
    Timeout,
}

/// Verdict plus a single-line human-readable explanation naming which
/// expectation failed and what was observed instead.
#[derive(Debug, Clone)]
pub struct Classification {
    pub verdict: Verdict,
    pub message: String,
}

impl Classification {
    fn new(verdict: Verdict, message: impl Into<String>) -> Self {
        Self {
            verdict,
            message: message.into(),
        }
    }
}

/// Classify a finished run. First match wins; exit-status mismatches and
/// timeouts are surfaced before the artifact is even considered, since a
/// crashed or killed child cannot be expected to have written a trustworthy
/// report.
///
/// A timed-out child never carries a meaningful exit status, so the
/// exit-expectation check only applies to children that actually exited.
pub fn classify(
    request: &RunRequest,
    outcome: &ProcessOutcome,
    artifact: &ArtifactState,
) -> Classification {
    if let Some(expected_success) = request.expect_process_success {
        if !outcome.timed_out && outcome.success != expected_success {
            let message = if expected_success {
                match outcome.exit_code {
                    Some(code) => format!(
                        "expected child process to exit successfully but it exited with code {}",
                        code
                    ),
                    None => "expected child process to exit successfully but it was killed by a signal"
                        .to_string(),
                }
            } else {
                "expected child process to fail but it exited successfully".to_string()
            };
            return Classification::new(Verdict::ProcessExitMismatch, message);
        }
    }

    if outcome.timed_out {
        return Classification::new(
            Verdict::Timeout,
            format!(
                "child process exceeded the {:.1}s timeout and was terminated",
                request.timeout.as_secs_f64()
            ),
        );
    }

    if request.accept_any_result {
        return Classification::new(
            Verdict::MatchedExpectation,
            "process exit matched expectation; result artifact not inspected",
        );
    }

    let artifact = match artifact {
        ArtifactState::Missing { path } => {
            return Classification::new(
                Verdict::MissingArtifact,
                format!("no result file found at {}", path.display()),
            );
        }
        ArtifactState::Malformed { raw } => {
            return Classification::new(
                Verdict::MalformedArtifact,
                format!("result file did not parse as JSON; raw content: {}", raw),
            );
        }
        ArtifactState::Present(artifact) => artifact,
    };

    if artifact.verdict != request.expect_verdict {
        let mut message = format!(
            "expected verdict {} but child reported {}",
            request.expect_verdict.as_str(),
            artifact.verdict.as_str()
        );
        if let Some(child_message) = &artifact.message {
            message.push_str(&format!(" ({})", child_message));
        }
        return Classification::new(Verdict::MismatchedVerdict, message);
    }

    let below_min = request
        .assertions_min
        .map_or(false, |min| artifact.assertions < min);
    let above_max = request
        .assertions_max
        .map_or(false, |max| artifact.assertions > max);
    if below_min || above_max {
        return Classification::new(
            Verdict::MismatchedAssertionCount,
            format!(
                "child ran {} assertion(s), outside expected bounds [{}, {}]",
                artifact.assertions,
                request
                    .assertions_min
                    .map_or("-".to_string(), |m| m.to_string()),
                request
                    .assertions_max
                    .map_or("-".to_string(), |m| m.to_string()),
            ),
        );
    }

    Classification::new(
        Verdict::MatchedExpectation,
        format!(
            "run matched expectations ({} assertion(s))",
            artifact.assertions
        ),
    )
}
