#![deny(warnings)]

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use ssh_conform::harness::config::DEFAULT_CONNECT_TIMEOUT_SECS;
use ssh_conform::harness::{HarnessConfig, Report, RunOptions, SshAttempter, run_scenarios};

/// Exit code for a run where every scenario passed.
const EXIT_PASS: u8 = 0;
/// Exit code for a run where at least one scenario failed.
const EXIT_FAIL: u8 = 1;
/// Exit code for a configuration/startup error before any scenario ran.
const EXIT_CONFIG: u8 = 2;

/// SSH authentication conformance harness.
///
/// Runs the scenarios defined in the configuration file against their target
/// servers and reports pass/fail per scenario.
#[derive(Debug, Parser)]
#[command(name = "ssh-conform", version, about)]
struct Cli {
    /// Path to the scenario configuration file (JSON).
    config: PathBuf,

    /// Maximum number of scenarios attempted in parallel.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Default per-attempt timeout in seconds, unless a scenario overrides it.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    timeout: u64,

    /// Write the JSON report to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    ExitCode::from(run(cli).await)
}

async fn run(cli: Cli) -> u8 {
    let config = match HarnessConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return EXIT_CONFIG;
        }
    };
    if config.scenarios.is_empty() {
        warn!("configuration defines no scenarios");
    }

    // Cancellation stops new attempts; in-flight attempts run to their own
    // timeout rather than being killed mid-exchange.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("cancellation requested; no new attempts will be issued");
            signal_cancel.cancel();
        }
    });

    let options = RunOptions {
        concurrency: cli.concurrency,
        default_timeout: Duration::from_secs(cli.timeout),
    };
    info!(
        scenarios = config.scenarios.len(),
        concurrency = options.concurrency,
        timeout_secs = cli.timeout,
        "starting conformance run"
    );

    let report = match run_scenarios(config.scenarios, options, Arc::new(SshAttempter), cancel)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("run aborted: {e}");
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = write_report(&report, cli.output.as_deref()) {
        error!("cannot write report: {e}");
        return EXIT_CONFIG;
    }

    info!(
        total = report.summary.total,
        passed = report.summary.passed,
        failed = report.summary.failed,
        "conformance run finished"
    );

    if report.all_passed() { EXIT_PASS } else { EXIT_FAIL }
}

fn write_report(report: &Report, output: Option<&std::path::Path>) -> std::io::Result<()> {
    let rendered = serde_json::to_string_pretty(report).map_err(std::io::Error::other)?;
    match output {
        Some(path) => fs::write(path, rendered + "\n"),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
