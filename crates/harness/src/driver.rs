//! Driver - orchestrates one out-of-process verification run end to end

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use uuid::Uuid;

use crate::artifact::{remove_idempotent, ArtifactState};
use crate::classify::{classify, Verdict};
use crate::config::{compose, RunRequest, ScenarioSource};
use crate::error::HarnessResult;
use crate::launcher::{launch, LaunchSpec, ProcessOutcome};
use crate::reconcile::{reconcile, AssertionSink};
use crate::staging::stage_all;

/// Environment variables forming the child process invocation contract.
pub const ENV_DISPLAY_SERVICE: &str = "APPSPEC_DISPLAY_SERVICE";
pub const ENV_HTML_RENDERER: &str = "APPSPEC_HTML_RENDERER";
pub const ENV_LOG_CONFIG: &str = "APPSPEC_LOG_CONFIG";
pub const ENV_RESULT_FILE: &str = "APPSPEC_RESULT_FILE";
pub const ENV_TEST_CLASS_NAME: &str = "APPSPEC_TEST_CLASS_NAME";
pub const ENV_TEST_METHOD_NAME: &str = "APPSPEC_TEST_METHOD_NAME";

/// Everything produced by one run, handed back to the caller.
#[derive(Debug)]
pub struct RunReport {
    pub verdict: Verdict,
    pub message: String,
    pub outcome: ProcessOutcome,
    pub artifact: ArtifactState,
    pub duration: Duration,
}

/// Configuration for spawning the application-under-test
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Path to the application binary.
    pub app_binary: PathBuf,

    /// Arguments placed before the scenario path (debug flags and the like).
    pub app_args: Vec<String>,

    /// Directory the per-test log routing points child logs at.
    pub logger_dir: PathBuf,

    /// Directory result artifacts are exported to. Each run gets its own
    /// uniquely-named file inside it.
    pub export_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            app_binary: PathBuf::from("target/debug/appspec"),
            app_args: vec!["--debug".to_string(), "--dev".to_string()],
            logger_dir: PathBuf::from("logger"),
            export_dir: std::env::temp_dir(),
        }
    }
}

/// Drives the application-under-test as an opaque black box: start it with
/// injected configuration, block until it exits, judge the run from its exit
/// status plus one result file.
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Execute one verification run.
    ///
    /// Compose the scenario + log routing, stage both on disk, launch the
    /// child with the environment contract, wait for exit (bounded by the
    /// request's timeout), then read the result file and classify. The
    /// result file is only read after termination is reported, never while
    /// the child might still be writing it.
    pub async fn run(&self, request: &RunRequest) -> HarnessResult<RunReport> {
        let start = Instant::now();

        let scenario_text = match &request.scenario {
            ScenarioSource::Inline(text) => text.clone(),
            ScenarioSource::File(path) => tokio::fs::read_to_string(path).await?,
        };
        let composed = compose(request, &scenario_text, &self.config.logger_dir);

        let export_path = self.export_path(request);
        // a stale export from an aborted earlier run must not satisfy this one
        remove_idempotent(&export_path)?;

        let log_config_json = serde_json::to_string(&composed.log_config)?;
        let file_id = format!("{}_{}", request.test_class, request.test_method);
        let log_hint = format!("{}_log_config", file_id);
        let scenario_hint = format!("{}_scenario", file_id);
        let staged = stage_all(&[
            (log_hint.as_str(), ".json", log_config_json.as_str()),
            (scenario_hint.as_str(), ".scn", composed.scenario_script.as_str()),
        ])?;
        let log_config_path = staged[0].path();
        let scenario_path = staged[1].path();

        let mut args = self.config.app_args.clone();
        args.push(scenario_path.display().to_string());

        let spec = LaunchSpec {
            program: self.config.app_binary.clone(),
            args,
            env: vec![
                (ENV_DISPLAY_SERVICE.into(), request.display_service.clone()),
                (ENV_HTML_RENDERER.into(), request.renderer.clone()),
                (ENV_LOG_CONFIG.into(), log_config_path.display().to_string()),
                (ENV_RESULT_FILE.into(), export_path.display().to_string()),
                (ENV_TEST_CLASS_NAME.into(), request.test_class.clone()),
                (ENV_TEST_METHOD_NAME.into(), request.test_method.clone()),
            ],
        };

        info!(
            "Running scenario for {}#{} (timeout {:?})",
            request.test_class, request.test_method, request.timeout
        );
        let outcome = launch(&spec, request.timeout).await?;
        drop(staged);

        let artifact = ArtifactState::read(&export_path)?;
        remove_idempotent(&export_path)?;

        let classification = classify(request, &outcome, &artifact);
        debug!("Classified as {:?}: {}", classification.verdict, classification.message);

        Ok(RunReport {
            verdict: classification.verdict,
            message: classification.message,
            outcome,
            artifact,
            duration: start.elapsed(),
        })
    }

    /// Execute a run and fold its result into the caller's assertion tally.
    pub async fn run_and_reconcile(
        &self,
        request: &RunRequest,
        sink: &mut impl AssertionSink,
    ) -> HarnessResult<RunReport> {
        let report = self.run(request).await?;
        let classification = crate::classify::Classification {
            verdict: report.verdict,
            message: report.message.clone(),
        };
        reconcile(&classification, &report.artifact, sink)?;
        Ok(report)
    }

    /// Per-run export path, partitioned by test identity plus a random
    /// suffix so parallel runs never collide on the filesystem namespace.
    fn export_path(&self, request: &RunRequest) -> PathBuf {
        self.config.export_dir.join(format!(
            "{}_{}_{}-result.json",
            request.test_class,
            request.test_method,
            Uuid::new_v4()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_paths_are_unique_per_run() {
        let driver = Driver::new(DriverConfig::default());
        let request = RunRequest::default();

        let a = driver.export_path(&request);
        let b = driver.export_path(&request);
        assert_ne!(a, b);
        assert!(a
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("AppspecTest_unnamed_"));
    }
}
