//! The `depot` scenario runner.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use depot::logger::{self, LogSink};
use depot::{Pace, RunOutcome, Scenario, ScenarioRun, drive};
use depot_core::DepotConfig;
use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;

/// Runs a receptacle scenario.
#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Scenario file (JSON5)
    scenario: PathBuf,

    /// Config file, created with defaults if missing
    #[arg(short, long, default_value = "config/depot_config.json5")]
    config: PathBuf,

    /// Don't wait between steps
    #[arg(long)]
    fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init().context("failed to set up logging")?;

    let config = DepotConfig::load_or_create(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;
    let period = Duration::from_micros(config.tick_period().as_micros().unsigned_abs());
    let scenario = Scenario::load(&cli.scenario)
        .with_context(|| format!("failed to load scenario {}", cli.scenario.display()))?;
    log::info!("Running scenario '{}'", scenario.name);

    let mut run = ScenarioRun::new(config, scenario)?;
    run.world_mut().ui.set_sink(Box::new(LogSink));

    let cancel_token = CancellationToken::new();
    let ctrl_c_token = cancel_token.clone();
    tokio::spawn(async move {
        if ctrl_c().await.is_ok() {
            log::info!("Received Ctrl-C, stopping");
            ctrl_c_token.cancel();
        }
    });

    let pace = if cli.fast { Pace::Fast } else { Pace::RealTime(period) };
    if drive(&mut run, pace, cancel_token).await == RunOutcome::Cancelled {
        log::warn!("Scenario cancelled, skipping expectations");
        return Ok(());
    }

    let failures = run.check();
    for failure in &failures {
        log::error!("{failure}");
    }
    if !failures.is_empty() {
        bail!("{} expectation(s) failed", failures.len());
    }
    log::info!("All expectations met, {} object(s) flushed", run.flushed());
    Ok(())
}
