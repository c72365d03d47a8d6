//! Project-scoped queries against the Primary and Metadata databases.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{Duration, NaiveDateTime};
use pqc_model::{Cell, ProjectId, Table, is_standard_sample};
use tracing::{debug, warn};

use crate::error::Result;
use crate::query::{query, quote_identifier};

pub const PRIMARY_TABLE: &str = "SingleFileReport";
pub const PRIMARY_KEY_COLUMN: &str = "Name";

pub const METADATA_TABLE: &str = "Metadata_Sample";
pub const METADATA_KEY_COLUMN: &str = "SampleName_ID";
pub const METADATA_PROJECT_COLUMN: &str = "ProjectID";
pub const METADATA_TIMESTAMP_COLUMN: &str = "CreationDate";

/// QC metrics selected from `SingleFileReport` unless configured otherwise.
pub const DEFAULT_PRIMARY_COLUMNS: [&str; 7] = [
    "Name",
    "System.Time.s",
    "Intensity.100.",
    "missed.cleavages.percent",
    "AllPeptides",
    "uniPepCount",
    "Protein",
];

pub fn default_primary_columns() -> Vec<String> {
    DEFAULT_PRIMARY_COLUMNS.iter().map(ToString::to_string).collect()
}

/// Lower bound of the monitoring window, formatted the way the metadata
/// database stores timestamps.
pub fn monitoring_cutoff(now: NaiveDateTime, monitor_days: u32) -> String {
    (now - Duration::days(i64::from(monitor_days)))
        .format("%Y-%m-%d %H:%M:%S.000")
        .to_string()
}

/// Lists the projects with samples created within the last `monitor_days`.
///
/// Standard samples are skipped and names that do not yield a project id are
/// logged and dropped. The result is sorted and free of duplicates.
pub fn active_project_ids(
    metadata_db: &Path,
    monitor_days: u32,
    now: NaiveDateTime,
) -> Result<Vec<ProjectId>> {
    let cutoff = monitoring_cutoff(now, monitor_days);
    let sql = format!(
        "SELECT {project} FROM {table} WHERE datetime({created}) > ?1",
        project = quote_identifier(METADATA_PROJECT_COLUMN),
        table = quote_identifier(METADATA_TABLE),
        created = quote_identifier(METADATA_TIMESTAMP_COLUMN),
    );
    let table = query(metadata_db, &sql, [cutoff.as_str()])?;

    let mut names = BTreeSet::new();
    for row in table.rows() {
        match row.first() {
            Some(Cell::Null) | None => {}
            Some(cell) => {
                names.insert(cell.render().into_owned());
            }
        }
    }

    let mut ids = BTreeSet::new();
    for name in names {
        if is_standard_sample(&name) {
            debug!(name = %name, "skipping standard sample project");
            continue;
        }
        match ProjectId::from_sample_name(&name) {
            Ok(id) => {
                ids.insert(id);
            }
            Err(error) => warn!(name = %name, %error, "cannot derive project id"),
        }
    }

    debug!(
        cutoff = %cutoff,
        count = ids.len(),
        "active projects listed"
    );
    Ok(ids.into_iter().collect())
}

/// Fetches the Primary rows of one project, matched by the SQL pattern.
///
/// An empty column list selects every column.
pub fn primary_rows(primary_db: &Path, project: &ProjectId, columns: &[String]) -> Result<Table> {
    let selection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(",")
    };
    let sql = format!(
        "SELECT {selection} FROM {table} WHERE {key} LIKE ?1",
        table = quote_identifier(PRIMARY_TABLE),
        key = quote_identifier(PRIMARY_KEY_COLUMN),
    );
    query(primary_db, &sql, [project.sql_pattern()])
}

/// Fetches the Metadata rows of one project, matched by the literal id.
pub fn metadata_rows(metadata_db: &Path, project: &ProjectId) -> Result<Table> {
    let sql = format!(
        "SELECT * FROM {table} WHERE {project} LIKE ?1",
        table = quote_identifier(METADATA_TABLE),
        project = quote_identifier(METADATA_PROJECT_COLUMN),
    );
    query(metadata_db, &sql, [project.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_monitoring_cutoff_format() {
        assert_eq!(
            monitoring_cutoff(at(2025, 8, 1), 30),
            "2025-07-02 12:30:00.000"
        );
        assert_eq!(monitoring_cutoff(at(2025, 8, 1), 0), "2025-08-01 12:30:00.000");
    }

    #[test]
    fn test_default_columns_start_with_key() {
        assert_eq!(default_primary_columns()[0], PRIMARY_KEY_COLUMN);
        assert_eq!(default_primary_columns().len(), 7);
    }
}
