//! Row-level comparison of a snapshot with freshly joined rows.

use std::collections::{HashMap, HashSet};
use std::fmt;

use pqc_db::PRIMARY_KEY_COLUMN;
use pqc_model::{Cell, Table, parse_number};
use serde::Serialize;

use crate::error::CompareError;
use crate::snapshot::SnapshotFile;

pub const RELATIVE_TOLERANCE: f64 = 1e-5;
pub const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Why a snapshot has to be rewritten in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteReason {
    ColumnSetChanged,
    ColumnOrderChanged,
    RowsChanged,
    RowsRemoved,
    ComparisonFailed,
}

impl RewriteReason {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ColumnSetChanged => "column set changed",
            Self::ColumnOrderChanged => "column order changed",
            Self::RowsChanged => "rows changed",
            Self::RowsRemoved => "rows removed",
            Self::ComparisonFailed => "comparison failed",
        }
    }
}

impl fmt::Display for RewriteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of comparing a snapshot with the fresh join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotDiff {
    /// Every fresh row is already on disk.
    Unchanged,
    /// The snapshot is a valid prefix; append these fresh rows, in order.
    Append(Vec<usize>),
    Rewrite(RewriteReason),
}

/// Decides how to bring `baseline` up to date with `fresh`.
///
/// Columns are compared by name first, then by order. Rows are grouped by
/// `Name`; a name present on both sides must have the same number of rows
/// and equal cells, numeric columns within `1e-8 + 1e-5·|fresh|`. Baseline
/// names absent from the fresh rows force a rewrite. What remains are new
/// names, which are appended.
pub fn diff_snapshot(baseline: &SnapshotFile, fresh: &Table) -> Result<SnapshotDiff, CompareError> {
    let Some(header) = &baseline.header else {
        return Ok(SnapshotDiff::Rewrite(RewriteReason::ColumnSetChanged));
    };

    let baseline_set: HashSet<&str> = header.iter().map(String::as_str).collect();
    let fresh_set: HashSet<&str> = fresh.columns().iter().map(String::as_str).collect();
    if baseline_set != fresh_set {
        return Ok(SnapshotDiff::Rewrite(RewriteReason::ColumnSetChanged));
    }
    if header.as_slice() != fresh.columns() {
        return Ok(SnapshotDiff::Rewrite(RewriteReason::ColumnOrderChanged));
    }

    for (idx, row) in baseline.rows.iter().enumerate() {
        if row.len() != header.len() {
            return Err(CompareError::RaggedRow {
                line: idx + 2,
                expected: header.len(),
                actual: row.len(),
            });
        }
    }

    let key = fresh
        .column_index(PRIMARY_KEY_COLUMN)
        .ok_or_else(|| CompareError::MissingKey {
            column: PRIMARY_KEY_COLUMN.to_string(),
        })?;
    let numeric: Vec<bool> = (0..fresh.width())
        .map(|idx| is_numeric_column(fresh, idx))
        .collect();

    let mut baseline_groups: HashMap<&str, Vec<&[String]>> = HashMap::new();
    for row in &baseline.rows {
        baseline_groups
            .entry(row[key].trim())
            .or_default()
            .push(row.as_slice());
    }

    let mut fresh_groups: HashMap<String, Vec<usize>> = HashMap::new();
    let mut fresh_order = Vec::new();
    for (idx, row) in fresh.rows().iter().enumerate() {
        let name = row[key].render().trim().to_string();
        fresh_groups
            .entry(name.clone())
            .or_insert_with(|| {
                fresh_order.push(name);
                Vec::new()
            })
            .push(idx);
    }

    let mut appended = Vec::new();
    for name in &fresh_order {
        let indices = &fresh_groups[name];
        match baseline_groups.get(name.as_str()) {
            None => appended.extend(indices.iter().copied()),
            Some(existing) => {
                if existing.len() != indices.len() {
                    return Ok(SnapshotDiff::Rewrite(RewriteReason::RowsChanged));
                }
                let same = existing
                    .iter()
                    .zip(indices)
                    .all(|(stored, &idx)| rows_equal(stored, &fresh.rows()[idx], &numeric));
                if !same {
                    return Ok(SnapshotDiff::Rewrite(RewriteReason::RowsChanged));
                }
            }
        }
    }

    if baseline_groups
        .keys()
        .any(|name| !fresh_groups.contains_key(*name))
    {
        return Ok(SnapshotDiff::Rewrite(RewriteReason::RowsRemoved));
    }

    if appended.is_empty() {
        Ok(SnapshotDiff::Unchanged)
    } else {
        appended.sort_unstable();
        Ok(SnapshotDiff::Append(appended))
    }
}

/// A column is numeric when it holds at least one number and no text.
fn is_numeric_column(table: &Table, idx: usize) -> bool {
    let mut any_number = false;
    for cell in table.column_values(idx) {
        match cell {
            Cell::Text(_) => return false,
            Cell::Integer(_) | Cell::Real(_) => any_number |= !cell.is_missing(),
            Cell::Null => {}
        }
    }
    any_number
}

fn rows_equal(stored: &[String], fresh: &[Cell], numeric: &[bool]) -> bool {
    stored
        .iter()
        .zip(fresh)
        .zip(numeric)
        .all(|((stored, fresh), &numeric)| {
            if numeric {
                numbers_equal(stored, fresh)
            } else {
                stored.trim() == fresh.render().trim()
            }
        })
}

fn numbers_equal(stored: &str, fresh: &Cell) -> bool {
    let stored = stored.trim();
    match (stored.is_empty(), fresh.as_f64()) {
        (true, None) => true,
        (true, Some(_)) | (false, None) => false,
        (false, Some(expected)) => match parse_number(stored) {
            Some(actual) => within_tolerance(actual, expected),
            None => false,
        },
    }
}

fn within_tolerance(actual: f64, expected: f64) -> bool {
    if actual == expected {
        return true;
    }
    (actual - expected).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * expected.abs()
}
