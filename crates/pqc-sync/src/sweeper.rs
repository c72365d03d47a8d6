//! Periodic retention sweep.

use std::time::Duration;

use chrono::Local;
use pqc_snapshot::RetentionSweeper;
use tracing::{info, warn};

use crate::shutdown::ShutdownSignal;

/// Sweeps, then waits `interval` on the shutdown signal, until shutdown.
///
/// Returns the number of sweeps attempted. A failed sweep is logged and
/// retried after the next interval.
pub fn run_sweeper(sweeper: &RetentionSweeper, shutdown: &ShutdownSignal, interval: Duration) -> usize {
    info!(
        path = %sweeper.output_dir().display(),
        interval_secs = interval.as_secs(),
        "retention sweeper started"
    );
    let mut sweeps = 0;
    while !shutdown.is_triggered() {
        if let Err(error) = sweeper.sweep_once(Local::now()) {
            warn!(%error, "retention sweep failed");
        }
        sweeps += 1;
        if shutdown.wait_timeout(interval) {
            break;
        }
    }
    info!(sweeps, "retention sweeper stopped");
    sweeps
}
