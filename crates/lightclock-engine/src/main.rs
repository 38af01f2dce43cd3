//! Simulation binary for Lightclock.
//!
//! Runs the light-between-mirrors scenario to completion and writes the
//! recorded history as JSON for the plotting front end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LIGHTCLOCK_CONFIG` or `lightclock-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the scenario and its initial universe
//! 4. Create the scheduler with the bootstrap record
//! 5. Run the configured number of rounds
//! 6. Write the history and log each world-line's end point

mod error;
mod progress;

use std::path::{Path, PathBuf};

use lightclock_core::config::SimulationConfig;
use lightclock_core::history;
use lightclock_core::scheduler::{Scheduler, SchedulerParams};
use lightclock_scenario::MirrorScenario;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "LIGHTCLOCK_CONFIG";

/// Configuration file used when `LIGHTCLOCK_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "lightclock-config.yaml";

/// Rounds between info-level progress lines.
const PROGRESS_EVERY: u64 = 10;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the run, or the history write fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging depends on it, so it comes first.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("lightclock-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    run(&config)?;

    info!("lightclock-engine finished");
    Ok(())
}

/// Run the scenario described by `config` and write its history.
fn run(config: &SimulationConfig) -> Result<(), EngineError> {
    // 3. Build the scenario.
    let scenario = MirrorScenario::from_config(config);
    info!(
        rod_length = scenario.rod_length,
        rod_velocity = scenario.rod_velocity,
        light_speed = scenario.light_speed,
        delta_t = scenario.delta_t,
        "Scenario ready"
    );

    // 4. Create the scheduler.
    let initial = scenario.initial_states();
    let mut scheduler = Scheduler::new(
        initial,
        scenario,
        SchedulerParams::from(&config.simulation),
    )?;

    // 5. Run.
    let mut progress = ProgressCallback::new(PROGRESS_EVERY);
    let summary = scheduler.run(config.simulation.rounds, &mut progress)?;
    info!(
        rounds = summary.rounds,
        advanced = summary.advanced,
        deferred = summary.deferred,
        "Run complete"
    );

    // 6. Persist and summarize.
    let store = scheduler.into_store();
    let output = Path::new(&config.output.path);
    history::write_history(output, &store)?;

    for (agent_id, line) in history::trajectories(&store) {
        if let Some((x, y)) = line.last() {
            info!(agent = %agent_id, points = line.len(), x, y, "World-line");
        }
    }

    Ok(())
}

/// Load configuration, falling back to defaults when no file exists.
///
/// Returns the path the configuration was read from, if any.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if config_path.exists() {
        let config = SimulationConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        let config = SimulationConfig::parse("")?;
        Ok((config, None))
    }
}
