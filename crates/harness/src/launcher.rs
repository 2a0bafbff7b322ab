//! Process launcher - spawns the application-under-test and waits for exit

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};

/// How long a SIGTERM'd child gets before the hard kill.
const TERM_GRACE: Duration = Duration::from_millis(500);

/// A launch call as pure data: executable, argument vector, environment map.
/// No shell is involved, so there is nothing to quote.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// What happened to the child process. Produced once per launch and threaded
/// through classification; there is no ambient exit-status state to consult.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOutcome {
    /// Exit code, when the child exited on its own. `None` when it was
    /// killed (timeout) or terminated by a signal.
    pub exit_code: Option<i32>,

    pub success: bool,

    /// The child outlived the timeout and was forcibly terminated.
    pub timed_out: bool,
}

/// Spawn the child and block until it exits or `timeout` elapses.
///
/// Stdio is inherited so a failing child's output lands in the harness's own
/// streams for debugging. A spawn failure is a hard [`HarnessError::Launch`],
/// never a classifiable outcome. Exit codes are not interpreted here; that
/// is the classifier's job.
pub async fn launch(spec: &LaunchSpec, timeout: Duration) -> HarnessResult<ProcessOutcome> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }

    debug!(
        "Launching {} with {} arg(s), timeout {:?}",
        spec.program.display(),
        spec.args.len(),
        timeout
    );

    let mut child = cmd.spawn().map_err(|e| {
        HarnessError::Launch(format!("failed to spawn {}: {}", spec.program.display(), e))
    })?;

    match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => {
            let status = status?;
            debug!("Child exited with {:?}", status.code());
            Ok(ProcessOutcome {
                exit_code: status.code(),
                success: status.success(),
                timed_out: false,
            })
        }
        Err(_) => {
            warn!(
                "Child did not exit within {:?}, terminating (pid: {:?})",
                timeout,
                child.id()
            );
            terminate(&mut child).await;
            Ok(ProcessOutcome {
                exit_code: None,
                success: false,
                timed_out: true,
            })
        }
    }
}

/// Terminate a child that overran its timeout: graceful signal first, then
/// a hard kill, then reap so nothing leaks.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
            if let Ok(Ok(status)) = tokio::time::timeout(TERM_GRACE, child.wait()).await {
                info!("Child exited after SIGTERM with {:?}", status.code());
                return;
            }
        }
    }

    if let Err(e) = child.kill().await {
        warn!("Failed to kill child: {}", e);
    }
    let _ = child.wait().await;
}
