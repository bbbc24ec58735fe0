//! sunset worker - revokes elevated group access whose change has closed
//!
//! Runs one revocation pass and exits, or runs passes on a fixed interval
//! until interrupted. Each pass prints a single JSON report line on stdout;
//! logs go to stderr.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sunset_revocation::{
    ChangeStatusPolicy, CoordinatorConfig, HttpChangeSource, PassSummary, RevocationCoordinator,
    RevocationOutcome,
};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

mod config;
mod logging;
mod providers;

use config::WorkerConfig;

/// Revoke time-bound group memberships whose justification has lapsed
#[derive(Parser)]
#[command(name = "sunset-worker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run a single pass even if SUNSET_INTERVAL_SECS is set
    #[arg(long)]
    once: bool,

    /// Override the per-pass deadline in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    deadline_secs: Option<u64>,
}

#[derive(Serialize)]
struct PassReport<'a> {
    summary: PassSummary,
    outcomes: &'a [RevocationOutcome],
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = WorkerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    logging::init_logging(&config.log_filter);

    let coordinator = build_coordinator(&config).unwrap_or_else(|e| {
        eprintln!("Startup error: {e}");
        std::process::exit(1);
    });

    let deadline = cli
        .deadline_secs
        .map_or(config.deadline, Duration::from_secs);

    info!(
        concurrency = config.concurrency,
        change_fetch_concurrency = config.change_fetch_concurrency,
        deadline_secs = deadline.as_secs(),
        interval_secs = config.interval.map(|i| i.as_secs()),
        "Starting sunset worker"
    );

    match config.interval.filter(|_| !cli.once) {
        None => run_pass(&coordinator, deadline).await,
        Some(interval) => {
            run_periodic(&coordinator, deadline, interval).await;
            ExitCode::SUCCESS
        }
    }
}

fn build_coordinator(
    config: &WorkerConfig,
) -> Result<RevocationCoordinator, Box<dyn std::error::Error>> {
    let registry = providers::build_registry(config)?;

    let source = HttpChangeSource::new(
        &config.changes_url,
        config
            .changes_token
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_owned())),
        config.http_timeout,
    )?;

    let mut policy = ChangeStatusPolicy::new().with_closure_grace(config.closure_grace);
    if let Some(max_age) = config.max_grant_age {
        policy = policy.with_max_grant_age(max_age);
    }

    let coordinator = RevocationCoordinator::new(
        Arc::new(source),
        Arc::new(registry),
        Arc::new(policy),
        CoordinatorConfig::default()
            .with_concurrency(config.concurrency)
            .with_change_fetch_concurrency(config.change_fetch_concurrency),
    )?;
    Ok(coordinator)
}

/// Runs one pass and reports it. Exit code 2 means the pass completed but
/// some grants failed.
async fn run_pass(coordinator: &RevocationCoordinator, deadline: Duration) -> ExitCode {
    match coordinator.run_revocation_pass(deadline).await {
        Ok(outcomes) => {
            let summary = PassSummary::from_outcomes(&outcomes);
            let report = PassReport {
                summary,
                outcomes: &outcomes,
            };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{line}"),
                Err(e) => error!(error = %e, "Failed to serialize pass report"),
            }

            if summary.has_failures() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "Revocation pass failed");
            ExitCode::FAILURE
        }
    }
}

async fn run_periodic(coordinator: &RevocationCoordinator, deadline: Duration, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = run_pass(coordinator, deadline).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested, stopping");
                break;
            }
        }
    }
}
