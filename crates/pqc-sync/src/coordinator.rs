//! The single consumer of change events.

use std::fmt;
use std::time::Duration;

use pqc_db::sync_database;
use pqc_model::{ChangeEvent, DatabaseKind, WatchedDatabase};
use pqc_snapshot::{BatchReport, ReconcileError, Reconciler};
use tracing::{debug, info, info_span, warn};

use crate::queue::ChangeReceiver;
use crate::shutdown::ShutdownSignal;

/// How long a pop waits before the shutdown signal is checked again.
pub const DEFAULT_POP_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Reconciling,
}

/// Result of handling one change event.
#[derive(Debug)]
pub enum EventOutcome {
    /// The database was synced and every active project reconciled.
    Reconciled {
        database: DatabaseKind,
        report: BatchReport,
    },
    /// The working copy could not be refreshed; reconciliation was skipped.
    SyncFailed { database: DatabaseKind },
    /// Synced, but the active projects could not be listed.
    ReconcileFailed {
        database: DatabaseKind,
        error: ReconcileError,
    },
    /// The event path belongs to no watched database.
    Unrecognized,
}

/// Counters kept by [`SyncCoordinator::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Events that led to a reconciliation pass.
    pub processed: usize,
    /// Events for unknown paths.
    pub skipped: usize,
    /// Events whose sync or reconciliation failed.
    pub failed: usize,
    /// Events left in the queue at shutdown.
    pub discarded: usize,
}

impl fmt::Display for CoordinatorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} skipped, {} failed, {} discarded",
            self.processed, self.skipped, self.failed, self.discarded
        )
    }
}

impl CoordinatorStats {
    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Reconciled { .. } => self.processed += 1,
            EventOutcome::Unrecognized => self.skipped += 1,
            EventOutcome::SyncFailed { .. } | EventOutcome::ReconcileFailed { .. } => {
                self.failed += 1;
            }
        }
    }
}

/// Pops change events one at a time, syncs the database they belong to, and
/// reconciles all snapshots.
pub struct SyncCoordinator {
    databases: Vec<WatchedDatabase>,
    reconciler: Reconciler,
    receiver: ChangeReceiver,
    shutdown: ShutdownSignal,
    pop_timeout: Duration,
    state: CoordinatorState,
}

impl SyncCoordinator {
    pub fn new(
        databases: Vec<WatchedDatabase>,
        reconciler: Reconciler,
        receiver: ChangeReceiver,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            databases,
            reconciler,
            receiver,
            shutdown,
            pop_timeout: DEFAULT_POP_TIMEOUT,
            state: CoordinatorState::Idle,
        }
    }

    #[must_use]
    pub fn with_pop_timeout(mut self, timeout: Duration) -> Self {
        self.pop_timeout = timeout;
        self
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// The watched database whose marker occurs in `event`'s path.
    pub fn classify(&self, event: &ChangeEvent) -> Option<&WatchedDatabase> {
        self.databases
            .iter()
            .find(|db| db.owns(&event.source_path))
    }

    /// Handles one event to completion.
    pub fn handle(&mut self, event: &ChangeEvent) -> EventOutcome {
        let Some(database) = self.classify(event).cloned() else {
            warn!(path = %event.source_path.display(), "change event for unknown path ignored");
            return EventOutcome::Unrecognized;
        };
        let _span = info_span!("handle_change", database = %database.kind).entered();

        self.state = CoordinatorState::Reconciling;
        let outcome = if !sync_database(&database.external, &database.working) {
            warn!("working copy not refreshed, reconciliation skipped");
            EventOutcome::SyncFailed {
                database: database.kind,
            }
        } else {
            match self.reconciler.reconcile_all() {
                Ok(report) => EventOutcome::Reconciled {
                    database: database.kind,
                    report,
                },
                Err(error) => {
                    warn!(%error, "reconciliation failed");
                    EventOutcome::ReconcileFailed {
                        database: database.kind,
                        error,
                    }
                }
            }
        };
        self.state = CoordinatorState::Idle;
        outcome
    }

    /// Runs until shutdown.
    ///
    /// An event already popped is always finished. Events still queued once
    /// shutdown is observed are discarded and counted.
    pub fn run(self) -> CoordinatorStats {
        self.run_with(|_| {})
    }

    /// Like [`SyncCoordinator::run`], calling `on_event` with every popped
    /// event before it is handled.
    pub fn run_with(mut self, mut on_event: impl FnMut(&ChangeEvent)) -> CoordinatorStats {
        info!("coordinator started");
        let mut stats = CoordinatorStats::default();
        while !self.shutdown.is_triggered() {
            let Some(event) = self.receiver.pop(self.pop_timeout) else {
                continue;
            };
            debug!(path = %event.source_path.display(), "change event received");
            on_event(&event);
            let outcome = self.handle(&event);
            stats.record(&outcome);
        }

        stats.discarded = self.receiver.try_drain().len();
        if stats.discarded > 0 {
            info!(count = stats.discarded, "queued change events discarded at shutdown");
        }
        info!(%stats, "coordinator stopped");
        stats
    }
}
