//! Run configuration - the request describing one verification run, and the
//! pure composition of scenario script + log routing from it

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::artifact::ChildVerdict;

/// Where the scenario text comes from.
#[derive(Debug, Clone)]
pub enum ScenarioSource {
    /// Literal scenario text. Still becomes a file-backed artifact before
    /// launch, since the child only accepts a script path.
    Inline(String),
    /// Path to an existing scenario file.
    File(PathBuf),
}

/// Immutable description of one verification run.
///
/// Built by the caller right before a run, never mutated, discarded after
/// the run completes.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub scenario: ScenarioSource,

    /// Wall-clock bound on the child process. The launcher force-terminates
    /// past this; the composed script also embeds it so a well-behaved child
    /// shuts itself down first.
    pub timeout: Duration,

    /// Expected process exit: `Some(true)` = must succeed, `Some(false)` =
    /// must fail, `None` = exit status is not checked.
    pub expect_process_success: Option<bool>,

    /// Escape hatch: only the process exit matters, the result artifact is
    /// not inspected at all.
    pub accept_any_result: bool,

    /// Verdict the child is expected to report.
    pub expect_verdict: ChildVerdict,

    /// Inclusive bounds on the child's assertion count, if checked.
    pub assertions_min: Option<u32>,
    pub assertions_max: Option<u32>,

    /// Display backend the child should activate.
    pub display_service: String,

    /// HTML renderer the child should activate.
    pub renderer: String,

    /// Test identity, used to correlate child-side logs and partition
    /// per-run file names across parallel invocations.
    pub test_class: String,
    pub test_method: String,

    /// Wrap the scenario so the child exits right after its first readiness
    /// signal. Used for smoke tests that only care about startup.
    pub exit_on_first_ready: bool,
}

impl Default for RunRequest {
    fn default() -> Self {
        Self {
            scenario: ScenarioSource::Inline(String::new()),
            timeout: Duration::from_secs(10),
            expect_process_success: Some(true),
            accept_any_result: false,
            expect_verdict: ChildVerdict::Success,
            assertions_min: None,
            assertions_max: None,
            display_service: "wv_local".to_string(),
            renderer: "calzini".to_string(),
            test_class: "AppspecTest".to_string(),
            test_method: "unnamed".to_string(),
            exit_on_first_ready: false,
        }
    }
}

/// Log routing: subsystem name to (verbosity level, destination path).
///
/// Serializes to the shape the child expects:
/// `{"Display": ["debug", "logger/..."], ...}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogConfig {
    routes: BTreeMap<String, (String, String)>,
}

impl LogConfig {
    pub fn route(&mut self, subsystem: &str, level: &str, destination: &str) {
        self.routes
            .insert(subsystem.to_string(), (level.to_string(), destination.to_string()));
    }

    pub fn routes(&self) -> &BTreeMap<String, (String, String)> {
        &self.routes
    }

    /// Debug-everything routing for a single test, with destinations keyed
    /// by test identity so a failing run's logs are easy to find. Display
    /// event traffic is funneled into one shared events file.
    pub fn for_test(test_class: &str, test_method: &str, logger_dir: &Path) -> Self {
        let file_id = format!("{}_{}", test_class, test_method);
        let dest = |tag: &str| {
            logger_dir
                .join(format!("test_failure_{}_{}.log", tag, file_id))
                .display()
                .to_string()
        };

        let mut config = Self::default();
        config.route("App", "debug", &dest("app"));
        config.route("Display", "debug", &dest("display"));
        config.route("Display::API", "debug", &dest("display_api"));
        config.route("Display::Events", "debug", &dest("events"));
        config.route("Display::Control", "debug", &dest("events"));
        config
    }
}

/// The two in-memory documents a run needs on disk before launch.
#[derive(Debug, Clone)]
pub struct ComposedRun {
    pub scenario_script: String,
    pub log_config: LogConfig,
}

/// Pure transformation from request to launchable documents. No I/O happens
/// here; the caller resolves file-sourced scenarios to text first and stages
/// both documents afterwards.
pub fn compose(request: &RunRequest, scenario_text: &str, logger_dir: &Path) -> ComposedRun {
    let mut script = format!("timeout {}\n", request.timeout.as_secs_f64());
    if request.exit_on_first_ready {
        script.push_str("exit_on_first_ready\n");
    }
    script.push_str(scenario_text);
    if !script.ends_with('\n') {
        script.push('\n');
    }

    ComposedRun {
        scenario_script: script,
        log_config: LogConfig::for_test(&request.test_class, &request.test_method, logger_dir),
    }
}
