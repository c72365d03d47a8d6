//! Deleting snapshots of projects that are no longer monitored.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use pqc_db::active_project_ids;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SweepError;
use crate::paths::snapshot_project_name;

const SECONDS_PER_DAY: u64 = 86_400;

/// Files seen and removed by one sweep.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SweepReport {
    /// Snapshot files found in the output directory.
    pub examined: usize,
    pub kept_active: usize,
    pub kept_recent: usize,
    pub deleted: Vec<PathBuf>,
    /// Files that should have been deleted but could not be.
    pub failed: Vec<PathBuf>,
}

/// Removes stale snapshots of inactive projects.
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    output_dir: PathBuf,
    metadata_db: PathBuf,
    monitor_days: u32,
    retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(output_dir: impl Into<PathBuf>, metadata_db: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            metadata_db: metadata_db.into(),
            monitor_days: 30,
            retention_days: 1,
        }
    }

    #[must_use]
    pub fn with_monitor_days(mut self, days: u32) -> Self {
        self.monitor_days = days;
        self
    }

    /// Minimum age of a snapshot of an inactive project before deletion.
    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Deletes every `*_ProjectData.csv` whose project is inactive at `now`
    /// and whose modification time is more than `retention_days` old.
    ///
    /// Nothing is deleted when the active projects cannot be listed.
    pub fn sweep_once(&self, now: DateTime<Local>) -> Result<SweepReport, SweepError> {
        let active: HashSet<String> =
            active_project_ids(&self.metadata_db, self.monitor_days, now.naive_local())
                .map_err(SweepError::ActiveProjects)?
                .into_iter()
                .map(String::from)
                .collect();

        let entries = fs::read_dir(&self.output_dir).map_err(|source| SweepError::ReadDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let now = SystemTime::from(now);
        let max_age = Duration::from_secs(u64::from(self.retention_days) * SECONDS_PER_DAY);
        let mut report = SweepReport::default();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warn!(%error, "unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            let file_name = entry.file_name();
            let Some(project) = file_name.to_str().and_then(snapshot_project_name) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            report.examined += 1;

            if active.contains(project) {
                report.kept_active += 1;
                continue;
            }

            let age = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok());
            match age {
                Some(age) if age > max_age => match fs::remove_file(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), project_id = project, "stale snapshot deleted");
                        report.deleted.push(path);
                    }
                    Err(error) => {
                        warn!(path = %path.display(), %error, "failed to delete stale snapshot");
                        report.failed.push(path);
                    }
                },
                _ => {
                    debug!(path = %path.display(), "inactive snapshot kept until it ages out");
                    report.kept_recent += 1;
                }
            }
        }

        info!(
            examined = report.examined,
            deleted = report.deleted.len(),
            "retention sweep finished"
        );
        Ok(report)
    }
}
