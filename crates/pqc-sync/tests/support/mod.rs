//! A scratch deployment: external databases, working copies, snapshot dir.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use chrono::Local;
use pqc_model::{DatabaseKind, WatchedDatabase};
use pqc_sync::SyncSettings;
use rusqlite::{Connection, params};
use tempfile::TempDir;

pub struct Site {
    pub dir: TempDir,
    pub primary: WatchedDatabase,
    pub metadata: WatchedDatabase,
    pub output: PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let external_primary = dir.path().join("external_MQQC_database");
        let external_metadata = dir.path().join("external_Meta_database");
        fs::create_dir_all(&external_primary).unwrap();
        fs::create_dir_all(&external_metadata).unwrap();

        let primary = WatchedDatabase::new(
            DatabaseKind::Primary,
            external_primary.join("list_collect.sqlite"),
            dir.path().join("work").join("list_collect.sqlite"),
        )
        .with_marker("external_MQQC_database");
        let metadata = WatchedDatabase::new(
            DatabaseKind::Metadata,
            external_metadata.join("Metadata.sqlite"),
            dir.path().join("work").join("Metadata.sqlite"),
        )
        .with_marker("external_Meta_database");

        Connection::open(&primary.external)
            .unwrap()
            .execute_batch(
                r#"CREATE TABLE SingleFileReport (
                       Name TEXT, "System.Time.s" REAL, "Intensity.100." REAL,
                       "missed.cleavages.percent" REAL, AllPeptides INTEGER,
                       uniPepCount INTEGER, Protein INTEGER);"#,
            )
            .unwrap();
        Connection::open(&metadata.external)
            .unwrap()
            .execute_batch(
                "CREATE TABLE Metadata_Sample (SampleName_ID TEXT, ProjectID TEXT, CreationDate TEXT);",
            )
            .unwrap();

        let output = dir.path().join("csvFiles");
        Self {
            dir,
            primary,
            metadata,
            output,
        }
    }

    pub fn settings(&self) -> SyncSettings {
        let mut settings = SyncSettings::new(self.primary.clone(), self.metadata.clone(), &self.output);
        settings.pop_timeout = Duration::from_millis(50);
        settings
    }

    /// Adds a sample created now to both external databases.
    pub fn add_sample(&self, project: &str, sample: &str) {
        let created = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Connection::open(&self.metadata.external)
            .unwrap()
            .execute(
                "INSERT INTO Metadata_Sample VALUES (?1, ?2, ?3)",
                params![format!("{sample}.raw"), project, created],
            )
            .unwrap();
        Connection::open(&self.primary.external)
            .unwrap()
            .execute(
                "INSERT INTO SingleFileReport VALUES (?1, 1.5, 2e9, 12.5, 4000, 3500, 800)",
                params![sample],
            )
            .unwrap();
    }

    pub fn snapshot(&self, project: &str) -> PathBuf {
        self.output.join(format!("{project}_ProjectData.csv"))
    }

    pub fn snapshot_lines(&self, project: &str) -> usize {
        fs::read_to_string(self.snapshot(project))
            .map(|content| content.lines().count())
            .unwrap_or(0)
    }
}

/// Moves a file's modification time `secs` into the future so a poll sees it.
pub fn bump_mtime(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(secs))
        .unwrap();
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    condition()
}
