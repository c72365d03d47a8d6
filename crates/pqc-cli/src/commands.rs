//! Subcommand implementations.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use pqc_cli::config::Settings;
use pqc_db::sync_database;
use pqc_model::{ModelError, ProjectId};
use pqc_snapshot::{BatchReport, SweepReport};
use pqc_sync::{PollingWatchStrategy, Runtime, RuntimeReport, ShutdownSignal};
use tracing::{info, info_span, warn};

use crate::summary::print_batch_report;

/// How often an unbounded run wakes up to check the shutdown signal.
const IDLE_WAIT: Duration = Duration::from_secs(60 * 60);

/// Starts the pipeline and blocks for `run_for`, or until interrupted.
pub fn run_pipeline(settings: &Settings, run_for: Option<Duration>) -> Result<RuntimeReport> {
    let strategy = PollingWatchStrategy::new(settings.poll_interval());
    let runtime = Runtime::start(settings.sync_settings(), &strategy)
        .context("failed to start the pipeline")?;
    print_batch_report(runtime.initial_report());

    let signal = runtime.shutdown_signal();
    install_interrupt_handler(&signal);
    match run_for {
        Some(duration) => {
            info!(seconds = duration.as_secs(), "running for a fixed duration");
            signal.wait_timeout(duration);
        }
        None => while !signal.wait_timeout(IDLE_WAIT) {},
    }
    Ok(runtime.shutdown())
}

/// Ctrl-C and SIGTERM trigger `signal` instead of killing the process, so the
/// current event is finished and the watchers are released.
fn install_interrupt_handler(signal: &ShutdownSignal) {
    let signal = signal.clone();
    let installed = ctrlc::set_handler(move || {
        info!("interrupt received, shutting down");
        signal.trigger();
    });
    if let Err(error) = installed {
        warn!(%error, "failed to install interrupt handler");
    }
}

/// Syncs both working copies (unless `skip_sync`) and reconciles once.
pub fn reconcile_once(settings: &Settings, skip_sync: bool) -> Result<BatchReport> {
    let _span = info_span!("reconcile_once").entered();
    let sync = settings.sync_settings();
    if !skip_sync {
        for database in sync.databases() {
            if !sync_database(&database.external, &database.working) {
                warn!(database = %database.kind, "sync failed, using existing working copy");
            }
        }
    }
    let reconciler = sync.reconciler();
    reconciler
        .ensure_output_dir()
        .context("failed to prepare the output directory")?;
    reconciler
        .reconcile_all()
        .context("failed to reconcile snapshots")
}

pub fn sweep_once(settings: &Settings) -> Result<SweepReport> {
    settings
        .sync_settings()
        .sweeper()
        .sweep_once(Local::now())
        .context("retention sweep failed")
}

pub fn derive_project_ids(samples: &[String]) -> Vec<(String, Result<ProjectId, ModelError>)> {
    samples
        .iter()
        .map(|sample| (sample.clone(), ProjectId::from_sample_name(sample)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_project_ids_keeps_order_and_errors() {
        let results = derive_project_ids(&["Astral_20250716_XYZ_HSdia_01".to_string(), String::new()]);
        assert_eq!(results[0].1.as_ref().unwrap().as_str(), "Astral_20250716_XYZ");
        assert!(results[1].1.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_interrupt_triggers_shutdown_signal() {
        let signal = ShutdownSignal::new();
        install_interrupt_handler(&signal);

        let status = std::process::Command::new("kill")
            .args(["-INT", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());
        assert!(signal.wait_timeout(Duration::from_secs(5)));
    }
}
