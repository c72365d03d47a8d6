//! Parameterized reads against a SQLite file.

use std::path::Path;

use pqc_model::{Cell, Table};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Params};

use crate::error::{DbError, Result};

/// Opens a database read-only so queries never create journal files next to
/// a working copy.
fn open_read_only(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|source| DbError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs one statement and collects every row.
pub fn query<P: Params>(path: &Path, sql: &str, params: P) -> Result<Table> {
    let conn = open_read_only(path)?;
    let query_err = |source: rusqlite::Error| DbError::Query {
        path: path.to_path_buf(),
        source,
    };

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let width = columns.len();
    let mut table = Table::new(columns);

    let mut rows = stmt.query(params).map_err(query_err)?;
    while let Some(row) = rows.next().map_err(query_err)? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            let value = row.get_ref(idx).map_err(query_err)?;
            cells.push(cell_from_value(value));
        }
        table.push_row(cells).map_err(|source| DbError::Row {
            path: path.to_path_buf(),
            source,
        })?;
    }

    tracing::trace!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "query complete"
    );
    Ok(table)
}

fn cell_from_value(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(v) => Cell::Integer(v),
        ValueRef::Real(v) => Cell::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Cell::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Lists the user tables of a database.
pub fn table_names(path: &Path) -> Result<Vec<String>> {
    let table = query(
        path,
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        [],
    )?;
    Ok(table
        .rows()
        .iter()
        .filter_map(|row| row.first().and_then(Cell::as_text).map(str::to_string))
        .collect())
}

/// Quotes an identifier for SQLite (`"System.Time.s"`).
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
