//! Project queries against fixture databases.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use pqc_db::{
    active_project_ids, default_primary_columns, metadata_rows, primary_rows, table_names,
};
use pqc_model::{Cell, ProjectId};
use rusqlite::Connection;
use tempfile::TempDir;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 8, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

fn metadata_db(dir: &Path) -> PathBuf {
    let path = dir.join("Metadata.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Metadata_Sample (SampleName_ID TEXT, ProjectID TEXT, CreationDate TEXT, Operator TEXT);
         INSERT INTO Metadata_Sample VALUES ('Astral_20250716_XYZ_HS_01.raw', 'Astral_20250716_XYZ', '2025-07-16 10:00:00.000', 'ab');
         INSERT INTO Metadata_Sample VALUES ('Astral_20250717_XYZ_HS_02.raw', 'Astral_20250716_XYZ', '2025-07-17 10:00:00.000', 'ab');
         INSERT INTO Metadata_Sample VALUES ('Astral_20250720_HSstd_01.raw', 'Astral_20250720_HSstd', '2025-07-20 10:00:00.000', 'cd');
         INSERT INTO Metadata_Sample VALUES ('Exploris_20250101_OLD_01.raw', 'Exploris_20250101_OLD', '2025-01-01 10:00:00.000', 'cd');
         INSERT INTO Metadata_Sample VALUES ('QExactive_20250728_ABC_01.raw', 'QExactive_20250728_ABC', '2025-07-28T08:15:00', 'ef');
         INSERT INTO Metadata_Sample VALUES ('orphan.raw', NULL, '2025-07-29 10:00:00', 'ef');",
    )
    .unwrap();
    path
}

fn primary_db(dir: &Path) -> PathBuf {
    let path = dir.join("list_collect.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"CREATE TABLE SingleFileReport (
               Name TEXT, "System.Time.s" REAL, "Intensity.100." REAL,
               "missed.cleavages.percent" REAL, AllPeptides INTEGER, uniPepCount INTEGER,
               Protein INTEGER, Extra TEXT);
           INSERT INTO SingleFileReport VALUES ('Astral_20250716_XYZ_HS_01', 1.5, 2e9, 12.5, 4000, 3500, 800, 'x');
           INSERT INTO SingleFileReport VALUES ('Astral_20250717_XYZ_HS_02', 1.6, 2.1e9, 11.0, 4100, 3600, 810, 'y');
           INSERT INTO SingleFileReport VALUES ('Astral_20250816_XYZ_HS_03', 1.7, 2.2e9, 10.0, 4200, 3700, 820, 'z');"#,
    )
    .unwrap();
    path
}

#[test]
fn active_projects_respect_window_and_standards() {
    let dir = TempDir::new().unwrap();
    let db = metadata_db(dir.path());

    let ids: Vec<String> = active_project_ids(&db, 30, now())
        .unwrap()
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(ids, vec!["Astral_20250716_XYZ", "QExactive_20250728_ABC"]);
}

#[test]
fn wider_window_includes_older_projects() {
    let dir = TempDir::new().unwrap();
    let db = metadata_db(dir.path());

    let ids = active_project_ids(&db, 365, now()).unwrap();
    assert!(ids.iter().any(|id| id.as_str() == "Exploris_20250101_OLD"));
}

#[test]
fn primary_rows_match_fuzzy_date_within_month() {
    let dir = TempDir::new().unwrap();
    let db = primary_db(dir.path());
    let project = ProjectId::from_sample_name("Astral_20250716_XYZ").unwrap();

    let table = primary_rows(&db, &project, &default_primary_columns()).unwrap();
    assert_eq!(table.columns(), default_primary_columns().as_slice());
    assert_eq!(table.height(), 2);
    assert_eq!(table.rows()[0][4], Cell::Integer(4000));
}

#[test]
fn empty_column_list_selects_everything() {
    let dir = TempDir::new().unwrap();
    let db = primary_db(dir.path());
    let project = ProjectId::from_sample_name("Astral_20250716_XYZ").unwrap();

    let table = primary_rows(&db, &project, &[]).unwrap();
    assert_eq!(table.width(), 8);
    assert_eq!(table.columns().last().map(String::as_str), Some("Extra"));
}

#[test]
fn metadata_rows_match_literal_project() {
    let dir = TempDir::new().unwrap();
    let db = metadata_db(dir.path());
    let project = ProjectId::from_sample_name("Astral_20250716_XYZ_HS_01.raw").unwrap();

    let table = metadata_rows(&db, &project).unwrap();
    assert_eq!(table.height(), 2);
    assert_eq!(table.columns()[0], "SampleName_ID");
}

#[test]
fn table_names_list_schema() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        table_names(&metadata_db(dir.path())).unwrap(),
        vec!["Metadata_Sample".to_string()]
    );
}
