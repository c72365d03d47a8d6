//! Composition root: startup sequence, worker threads, and shutdown.

use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pqc_db::{METADATA_TABLE, PRIMARY_TABLE, default_primary_columns, sync_database, table_names};
use pqc_model::{DatabaseKind, WatchedDatabase};
use pqc_snapshot::{BatchReport, Reconciler, RetentionSweeper};
use tracing::{error, info, warn};

use crate::coordinator::{CoordinatorStats, DEFAULT_POP_TIMEOUT, SyncCoordinator};
use crate::error::RuntimeError;
use crate::queue::{ChangeEventQueue, ChangeSender};
use crate::shutdown::ShutdownSignal;
use crate::sweeper::run_sweeper;
use crate::watch::{WatchHandle, WatchStrategy};

/// Everything the runtime needs to know about its environment.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub primary: WatchedDatabase,
    pub metadata: WatchedDatabase,
    pub output_dir: PathBuf,
    /// Days a project stays active after its latest sample.
    pub monitor_days: u32,
    /// Age after which an inactive project's snapshot is deleted.
    pub retention_days: u32,
    pub sweep_interval: Duration,
    pub pop_timeout: Duration,
    /// Primary columns to select; empty selects all.
    pub primary_columns: Vec<String>,
}

impl SyncSettings {
    pub fn new(primary: WatchedDatabase, metadata: WatchedDatabase, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary,
            metadata,
            output_dir: output_dir.into(),
            monitor_days: 30,
            retention_days: 1,
            sweep_interval: Duration::from_secs(24 * 60 * 60),
            pop_timeout: DEFAULT_POP_TIMEOUT,
            primary_columns: default_primary_columns(),
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(&self.primary.working, &self.metadata.working, &self.output_dir)
            .with_monitor_days(self.monitor_days)
            .with_primary_columns(self.primary_columns.clone())
    }

    pub fn sweeper(&self) -> RetentionSweeper {
        RetentionSweeper::new(&self.output_dir, &self.metadata.working)
            .with_monitor_days(self.monitor_days)
            .with_retention_days(self.retention_days)
    }

    pub fn databases(&self) -> [&WatchedDatabase; 2] {
        [&self.primary, &self.metadata]
    }
}

/// What the worker threads did before shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeReport {
    pub coordinator: CoordinatorStats,
    pub sweeps: usize,
}

/// The running pipeline: watchers, coordinator thread, sweeper thread.
///
/// Dropping a runtime shuts it down; [`Runtime::shutdown`] does the same and
/// returns what the workers did.
pub struct Runtime {
    shutdown: ShutdownSignal,
    sender: ChangeSender,
    watchers: Vec<WatchHandle>,
    coordinator: Option<JoinHandle<CoordinatorStats>>,
    sweeper: Option<JoinHandle<usize>>,
    initial_report: BatchReport,
}

impl Runtime {
    /// Runs the startup sequence and spawns the workers.
    ///
    /// 1. sync both working copies from their external sources
    /// 2. warn about missing tables
    /// 3. create the output directory and reconcile every active project;
    ///    a failed pass is logged and left to the next change event
    /// 4. start one watcher per external database
    /// 5. spawn the coordinator and the sweeper
    pub fn start(settings: SyncSettings, strategy: &dyn WatchStrategy) -> Result<Self, RuntimeError> {
        for database in settings.databases() {
            if !sync_database(&database.external, &database.working) {
                warn!(database = %database.kind, "initial sync failed, using existing working copy");
            }
            check_schema(database);
        }

        let reconciler = settings.reconciler();
        reconciler.ensure_output_dir().map_err(RuntimeError::OutputDir)?;
        let initial_report = match reconciler.reconcile_all() {
            Ok(report) => report,
            Err(error) => {
                error!(%error, "initial reconciliation failed, waiting for the next change");
                BatchReport::default()
            }
        };

        let (sender, receiver) = ChangeEventQueue::new();
        let mut watchers = Vec::with_capacity(2);
        for database in settings.databases() {
            watchers.push(strategy.start(&database.external, sender.clone())?);
        }

        let shutdown = ShutdownSignal::new();
        let coordinator = SyncCoordinator::new(
            vec![settings.primary.clone(), settings.metadata.clone()],
            reconciler,
            receiver,
            shutdown.clone(),
        )
        .with_pop_timeout(settings.pop_timeout);
        let coordinator = thread::Builder::new()
            .name("pqc-coordinator".to_string())
            .spawn(move || coordinator.run())
            .map_err(|source| RuntimeError::Spawn {
                name: "coordinator",
                source,
            })?;

        let sweeper = settings.sweeper();
        let sweep_interval = settings.sweep_interval;
        let sweeper_shutdown = shutdown.clone();
        let sweeper = match thread::Builder::new()
            .name("pqc-sweeper".to_string())
            .spawn(move || run_sweeper(&sweeper, &sweeper_shutdown, sweep_interval))
        {
            Ok(handle) => handle,
            Err(source) => {
                shutdown.trigger();
                let _ = coordinator.join();
                return Err(RuntimeError::Spawn {
                    name: "sweeper",
                    source,
                });
            }
        };

        info!(
            output_dir = %settings.output_dir.display(),
            projects = initial_report.len(),
            "runtime started"
        );
        Ok(Self {
            shutdown,
            sender,
            watchers,
            coordinator: Some(coordinator),
            sweeper: Some(sweeper),
            initial_report,
        })
    }

    /// Outcome of the reconciliation run during startup. Empty when the
    /// active projects could not be listed.
    pub fn initial_report(&self) -> &BatchReport {
        &self.initial_report
    }

    /// A producer handle for injecting change events.
    pub fn sender(&self) -> ChangeSender {
        self.sender.clone()
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Stops watching, lets the coordinator finish its current event, and
    /// joins both workers.
    pub fn shutdown(mut self) -> RuntimeReport {
        self.stop()
    }

    fn stop(&mut self) -> RuntimeReport {
        self.shutdown.trigger();
        self.watchers.clear();

        let mut report = RuntimeReport::default();
        if let Some(handle) = self.coordinator.take() {
            match handle.join() {
                Ok(stats) => report.coordinator = stats,
                Err(_) => error!("coordinator thread panicked"),
            }
        }
        if let Some(handle) = self.sweeper.take() {
            match handle.join() {
                Ok(sweeps) => report.sweeps = sweeps,
                Err(_) => error!("sweeper thread panicked"),
            }
        }
        info!(
            processed = report.coordinator.processed,
            discarded = report.coordinator.discarded,
            sweeps = report.sweeps,
            "runtime stopped"
        );
        report
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.coordinator.is_some() || self.sweeper.is_some() {
            self.stop();
        }
    }
}

fn check_schema(database: &WatchedDatabase) {
    let expected = match database.kind {
        DatabaseKind::Primary => PRIMARY_TABLE,
        DatabaseKind::Metadata => METADATA_TABLE,
    };
    match table_names(&database.working) {
        Ok(tables) if tables.iter().any(|t| t == expected) => {}
        Ok(tables) => warn!(
            database = %database.kind,
            expected,
            found = ?tables,
            "expected table missing"
        ),
        Err(error) => warn!(database = %database.kind, %error, "cannot inspect schema"),
    }
}
