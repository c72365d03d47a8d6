//! Right join of Primary rows onto Metadata rows.

use std::collections::{HashMap, HashSet};

use pqc_db::{
    METADATA_KEY_COLUMN, METADATA_TABLE, METADATA_TIMESTAMP_COLUMN, PRIMARY_KEY_COLUMN,
    PRIMARY_TABLE,
};
use pqc_model::{Cell, TEMPORAL_COLUMNS, Table, TemporalColumns};
use tracing::warn;

use crate::error::{ReconcileError, Result};

pub const PRIMARY_SUFFIX: &str = "_mqqc";
pub const METADATA_SUFFIX: &str = "_metadata";

/// Strips a trailing `.raw` from a metadata sample name.
pub fn strip_raw_suffix(name: &str) -> &str {
    name.strip_suffix(".raw").unwrap_or(name)
}

/// Joins the Primary rows of one project onto its Metadata rows.
///
/// Every Metadata row is kept, in order; a Metadata row with several Primary
/// matches yields one row per match and a row without a match gets empty
/// Primary cells. Output columns:
///
/// 1. the Primary columns, with `Name` holding the stripped metadata sample
///    name
/// 2. the Metadata columns except `SampleName_ID`
/// 3. `Date`, `Time`, `DateTime` derived from `CreationDate`
///
/// Non-key column names present on both sides get `_mqqc` and `_metadata`
/// suffixes.
pub fn join_project_rows(primary: &Table, metadata: &Table) -> Result<Table> {
    let primary_key = primary
        .column_index(PRIMARY_KEY_COLUMN)
        .ok_or(ReconcileError::MissingColumn {
            table: PRIMARY_TABLE,
            column: PRIMARY_KEY_COLUMN,
        })?;
    let metadata_key = metadata
        .column_index(METADATA_KEY_COLUMN)
        .ok_or(ReconcileError::MissingColumn {
            table: METADATA_TABLE,
            column: METADATA_KEY_COLUMN,
        })?;
    let timestamp = metadata
        .column_index(METADATA_TIMESTAMP_COLUMN)
        .ok_or(ReconcileError::MissingColumn {
            table: METADATA_TABLE,
            column: METADATA_TIMESTAMP_COLUMN,
        })?;

    let primary_names: HashSet<&str> = primary
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != primary_key)
        .map(|(_, name)| name.as_str())
        .collect();
    let metadata_names: HashSet<&str> = metadata
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != metadata_key)
        .map(|(_, name)| name.as_str())
        .collect();

    let mut columns = Vec::with_capacity(primary.width() + metadata.width() + 2);
    for (idx, name) in primary.columns().iter().enumerate() {
        if idx == primary_key {
            columns.push(PRIMARY_KEY_COLUMN.to_string());
        } else if metadata_names.contains(name.as_str()) {
            columns.push(format!("{name}{PRIMARY_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }
    let metadata_indices: Vec<usize> = (0..metadata.width())
        .filter(|idx| *idx != metadata_key)
        .collect();
    for &idx in &metadata_indices {
        let name = &metadata.columns()[idx];
        if primary_names.contains(name.as_str()) || name == PRIMARY_KEY_COLUMN {
            columns.push(format!("{name}{METADATA_SUFFIX}"));
        } else {
            columns.push(name.clone());
        }
    }
    columns.extend(TEMPORAL_COLUMNS.iter().map(ToString::to_string));

    let mut primary_by_name: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, row) in primary.rows().iter().enumerate() {
        primary_by_name
            .entry(row[primary_key].render().into_owned())
            .or_default()
            .push(idx);
    }

    let mut joined = Table::new(columns);
    for meta_row in metadata.rows() {
        let name_cell = match &meta_row[metadata_key] {
            Cell::Null => Cell::Null,
            cell => Cell::text(strip_raw_suffix(&cell.render())),
        };
        let key = name_cell.render().into_owned();

        let temporal = TemporalColumns::from_cell(&meta_row[timestamp]).unwrap_or_else(|| {
            warn!(
                sample = %key,
                creation_date = %meta_row[timestamp],
                "creation date missing or malformed, using sentinel"
            );
            TemporalColumns::sentinel()
        });

        let matches = primary_by_name.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let primary_sources: Vec<Option<&Vec<Cell>>> = if matches.is_empty() {
            vec![None]
        } else {
            matches.iter().map(|&idx| primary.rows().get(idx)).collect()
        };

        for primary_row in primary_sources {
            let mut row = Vec::with_capacity(joined.width());
            for idx in 0..primary.width() {
                if idx == primary_key {
                    row.push(name_cell.clone());
                } else {
                    row.push(primary_row.map_or(Cell::Null, |r| r[idx].clone()));
                }
            }
            row.extend(metadata_indices.iter().map(|&idx| meta_row[idx].clone()));
            row.extend(temporal.clone().into_cells());
            joined.push_row(row)?;
        }
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> Table {
        Table::from_rows(
            vec!["Name".into(), "Protein".into(), "Operator".into()],
            vec![
                vec![Cell::text("P_20250716_X_01"), Cell::Integer(800), Cell::text("mq")],
                vec![Cell::text("P_20250716_X_02"), Cell::Integer(810), Cell::text("mq")],
                vec![Cell::text("P_20250716_X_02"), Cell::Integer(811), Cell::text("mq")],
            ],
        )
        .unwrap()
    }

    fn metadata() -> Table {
        Table::from_rows(
            vec![
                "SampleName_ID".into(),
                "ProjectID".into(),
                "CreationDate".into(),
                "Operator".into(),
            ],
            vec![
                vec![
                    Cell::text("P_20250716_X_02.raw"),
                    Cell::text("P_20250716_X"),
                    Cell::text("2025-07-16 10:11:12.000"),
                    Cell::text("ab"),
                ],
                vec![
                    Cell::text("P_20250716_X_03.raw"),
                    Cell::text("P_20250716_X"),
                    Cell::text("not a date"),
                    Cell::text("cd"),
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_columns_and_suffixes() {
        let joined = join_project_rows(&primary(), &metadata()).unwrap();
        assert_eq!(
            joined.columns(),
            [
                "Name",
                "Protein",
                "Operator_mqqc",
                "ProjectID",
                "CreationDate",
                "Operator_metadata",
                "Date",
                "Time",
                "DateTime"
            ]
        );
    }

    #[test]
    fn test_right_join_rows() {
        let joined = join_project_rows(&primary(), &metadata()).unwrap();
        assert_eq!(joined.height(), 3);

        let names: Vec<String> = joined
            .column_values(0)
            .map(|c| c.render().into_owned())
            .collect();
        assert_eq!(names, ["P_20250716_X_02", "P_20250716_X_02", "P_20250716_X_03"]);
        assert_eq!(joined.rows()[0][1], Cell::Integer(810));
        assert_eq!(joined.rows()[1][1], Cell::Integer(811));
        assert_eq!(joined.rows()[2][1], Cell::Null);
        assert_eq!(joined.rows()[2][5], Cell::text("cd"));
    }

    #[test]
    fn test_temporal_columns_and_sentinel() {
        let joined = join_project_rows(&primary(), &metadata()).unwrap();
        assert_eq!(
            joined.rows()[0][6..],
            [
                Cell::text("2025.07.16"),
                Cell::text("10:11:12"),
                Cell::text("2025-07-16T10:11:12")
            ]
        );
        assert_eq!(
            joined.rows()[2][6..],
            [
                Cell::text("1900.01.01"),
                Cell::text("00:00:00"),
                Cell::text("1900-01-01T00:00:00")
            ]
        );
    }

    #[test]
    fn test_missing_key_column() {
        let bad = Table::new(vec!["Sample".into()]);
        let err = join_project_rows(&bad, &metadata()).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MissingColumn { column: "Name", .. }
        ));
    }

    #[test]
    fn test_strip_raw_suffix_only_at_end() {
        assert_eq!(strip_raw_suffix("A_1.raw"), "A_1");
        assert_eq!(strip_raw_suffix("A.raw_1"), "A.raw_1");
    }
}
