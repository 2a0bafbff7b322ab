//! Command-line driver for one scenario run
//!
//! Runs a scenario file against an application binary and prints the
//! classification. Exit code 0 = matched expectation, 1 = mismatch,
//! 2 = harness error.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use appspec_harness::{
    ChildVerdict, Driver, DriverConfig, HarnessResult, RunReport, RunRequest, ScenarioSource,
    Verdict,
};

#[derive(Parser, Debug)]
#[command(name = "appspec-drive")]
#[command(about = "Run a scenario against a GUI application and classify the outcome")]
struct Args {
    /// Path to the scenario file
    scenario: PathBuf,

    /// Path to the application binary
    #[arg(long, default_value = "target/debug/appspec")]
    app: PathBuf,

    /// Extra argument placed before the scenario path (repeatable)
    #[arg(long = "app-arg")]
    app_args: Vec<String>,

    /// Timeout in seconds before the child is terminated
    #[arg(long, default_value = "10.0")]
    timeout: f64,

    /// Display backend the child should activate
    #[arg(long, default_value = "wv_local")]
    display_service: String,

    /// HTML renderer the child should activate
    #[arg(long, default_value = "calzini")]
    renderer: String,

    /// Verdict the child is expected to report (success, failure, error, skip)
    #[arg(long, default_value = "success")]
    expect_verdict: String,

    /// Expect the child process itself to exit with a failure code
    #[arg(long)]
    expect_process_failure: bool,

    /// Only check the process exit; skip result artifact inspection
    #[arg(long)]
    accept_any_result: bool,

    /// Minimum expected assertion count
    #[arg(long)]
    assertions_min: Option<u32>,

    /// Maximum expected assertion count
    #[arg(long)]
    assertions_max: Option<u32>,

    /// Directory for child-side log files
    #[arg(long, default_value = "logger")]
    logger_dir: PathBuf,

    /// Test identity used for log correlation
    #[arg(long, default_value = "AppspecDrive")]
    test_class: String,

    /// Test identity used for log correlation
    #[arg(long, default_value = "cli")]
    test_method: String,

    /// Ask the child to exit right after its first readiness signal
    #[arg(long)]
    exit_on_first_ready: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(run(args)) {
        Ok(report) => {
            println!("{:?}: {}", report.verdict, report.message);
            if report.verdict == Verdict::MatchedExpectation {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> HarnessResult<RunReport> {
    let expect_verdict = match args.expect_verdict.as_str() {
        "failure" => ChildVerdict::Failure,
        "error" => ChildVerdict::Error,
        "skip" => ChildVerdict::Skip,
        _ => ChildVerdict::Success,
    };

    let driver = Driver::new(DriverConfig {
        app_binary: args.app,
        app_args: args.app_args,
        logger_dir: args.logger_dir,
        export_dir: std::env::temp_dir(),
    });

    let request = RunRequest {
        scenario: ScenarioSource::File(args.scenario),
        timeout: Duration::from_secs_f64(args.timeout),
        expect_process_success: Some(!args.expect_process_failure),
        accept_any_result: args.accept_any_result,
        expect_verdict,
        assertions_min: args.assertions_min,
        assertions_max: args.assertions_max,
        display_service: args.display_service,
        renderer: args.renderer,
        test_class: args.test_class,
        test_method: args.test_method,
        exit_on_first_ready: args.exit_on_first_ready,
    };

    driver.run(&request).await
}
