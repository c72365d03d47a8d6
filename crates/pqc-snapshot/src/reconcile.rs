//! Bringing every active project's snapshot up to date.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use pqc_db::{active_project_ids, default_primary_columns, metadata_rows, primary_rows};
use pqc_model::ProjectId;
use tracing::{debug, info, info_span, warn};

use crate::diff::{RewriteReason, SnapshotDiff, diff_snapshot};
use crate::error::{ReconcileError, Result};
use crate::join::join_project_rows;
use crate::paths::snapshot_path;
use crate::report::{BatchReport, SnapshotAction};
use crate::snapshot::{append_rows, read_snapshot, write_snapshot};

/// Rebuilds project rows from the working databases and reconciles each
/// snapshot in the output directory.
#[derive(Debug, Clone)]
pub struct Reconciler {
    primary_db: PathBuf,
    metadata_db: PathBuf,
    output_dir: PathBuf,
    monitor_days: u32,
    primary_columns: Vec<String>,
}

impl Reconciler {
    pub fn new(
        primary_db: impl Into<PathBuf>,
        metadata_db: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            primary_db: primary_db.into(),
            metadata_db: metadata_db.into(),
            output_dir: output_dir.into(),
            monitor_days: 30,
            primary_columns: default_primary_columns(),
        }
    }

    /// Width of the active-project window in days.
    #[must_use]
    pub fn with_monitor_days(mut self, days: u32) -> Self {
        self.monitor_days = days;
        self
    }

    /// Primary columns to select; empty selects all of them.
    #[must_use]
    pub fn with_primary_columns(mut self, columns: Vec<String>) -> Self {
        self.primary_columns = columns;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn monitor_days(&self) -> u32 {
        self.monitor_days
    }

    /// Creates the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<()> {
        if !self.output_dir.is_dir() {
            info!(path = %self.output_dir.display(), "creating snapshot directory");
        }
        fs::create_dir_all(&self.output_dir).map_err(|source| ReconcileError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Projects with samples inside the monitoring window ending at `now`.
    pub fn active_projects(&self, now: NaiveDateTime) -> Result<Vec<ProjectId>> {
        Ok(active_project_ids(&self.metadata_db, self.monitor_days, now)?)
    }

    /// Reconciles every active project as of the current local time.
    pub fn reconcile_all(&self) -> Result<BatchReport> {
        self.reconcile_all_at(Local::now().naive_local())
    }

    /// Reconciles every project active at `now`.
    ///
    /// Fails only when the active projects cannot be listed; per-project
    /// failures are recorded in the report and the batch continues.
    pub fn reconcile_all_at(&self, now: NaiveDateTime) -> Result<BatchReport> {
        let projects = self.active_projects(now)?;
        info!(count = projects.len(), "reconciling active projects");

        let mut report = BatchReport::default();
        for project in projects {
            let result = self.reconcile_project(&project);
            if let Err(error) = &result {
                warn!(project_id = %project, %error, "project reconciliation failed");
            }
            report.push(project, result);
        }

        info!(
            projects = report.len(),
            created = report.created(),
            appended = report.appended(),
            rewritten = report.rewritten(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Brings one project's snapshot up to date.
    pub fn reconcile_project(&self, project: &ProjectId) -> Result<SnapshotAction> {
        let _span = info_span!("reconcile_project", project_id = %project).entered();

        let primary = primary_rows(&self.primary_db, project, &self.primary_columns)?;
        let metadata = metadata_rows(&self.metadata_db, project)?;
        let fresh = join_project_rows(&primary, &metadata)?;
        let path = snapshot_path(&self.output_dir, project);
        debug!(
            primary_rows = primary.height(),
            metadata_rows = metadata.height(),
            joined_rows = fresh.height(),
            path = %path.display(),
            "project rows joined"
        );

        if !path.exists() {
            if fresh.is_empty() {
                debug!("no rows, snapshot not created");
                return Ok(SnapshotAction::Skipped);
            }
            write_snapshot(&path, &fresh)?;
            info!(rows = fresh.height(), "snapshot created");
            return Ok(SnapshotAction::Created {
                rows: fresh.height(),
            });
        }

        let baseline = read_snapshot(&path)?;
        let diff = diff_snapshot(&baseline, &fresh).unwrap_or_else(|error| {
            warn!(%error, "snapshot comparison failed, rewriting");
            SnapshotDiff::Rewrite(RewriteReason::ComparisonFailed)
        });

        match diff {
            SnapshotDiff::Unchanged => {
                debug!("snapshot unchanged");
                Ok(SnapshotAction::Unchanged)
            }
            SnapshotDiff::Append(indices) => {
                append_rows(&path, &fresh, &indices)?;
                info!(rows = indices.len(), "rows appended");
                Ok(SnapshotAction::Appended {
                    rows: indices.len(),
                })
            }
            SnapshotDiff::Rewrite(reason) => {
                write_snapshot(&path, &fresh)?;
                info!(rows = fresh.height(), %reason, "snapshot rewritten");
                Ok(SnapshotAction::Rewritten {
                    rows: fresh.height(),
                    reason,
                })
            }
        }
    }
}
