//! Fixture databases shared by the snapshot integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params};
use tempfile::TempDir;

pub struct Fixture {
    _dir: TempDir,
    pub primary: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let primary = dir.path().join("list_collect.sqlite");
        let metadata = dir.path().join("Metadata.sqlite");
        let output = dir.path().join("csvFiles");

        Connection::open(&primary)
            .unwrap()
            .execute_batch(
                r#"CREATE TABLE SingleFileReport (
                       Name TEXT, "System.Time.s" REAL, "Intensity.100." REAL,
                       "missed.cleavages.percent" REAL, AllPeptides INTEGER,
                       uniPepCount INTEGER, Protein INTEGER);"#,
            )
            .unwrap();
        Connection::open(&metadata)
            .unwrap()
            .execute_batch(
                "CREATE TABLE Metadata_Sample (SampleName_ID TEXT, ProjectID TEXT, CreationDate TEXT);",
            )
            .unwrap();

        Self {
            _dir: dir,
            primary,
            metadata,
            output,
        }
    }

    pub fn add_sample(&self, project: &str, sample: &str, created: &str, time_s: f64, peptides: i64) {
        Connection::open(&self.metadata)
            .unwrap()
            .execute(
                "INSERT INTO Metadata_Sample VALUES (?1, ?2, ?3)",
                params![format!("{sample}.raw"), project, created],
            )
            .unwrap();
        Connection::open(&self.primary)
            .unwrap()
            .execute(
                "INSERT INTO SingleFileReport VALUES (?1, ?2, 2e9, 12.5, ?3, ?4, 800)",
                params![sample, time_s, peptides, peptides - 500],
            )
            .unwrap();
    }

    pub fn execute_primary(&self, sql: &str) {
        Connection::open(&self.primary)
            .unwrap()
            .execute_batch(sql)
            .unwrap();
    }

    pub fn execute_metadata(&self, sql: &str) {
        Connection::open(&self.metadata)
            .unwrap()
            .execute_batch(sql)
            .unwrap();
    }

    pub fn snapshot(&self, project: &str) -> PathBuf {
        self.output.join(format!("{project}_ProjectData.csv"))
    }

    pub fn read(&self, project: &str) -> String {
        std::fs::read_to_string(self.snapshot(project)).unwrap()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output
    }
}

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}
