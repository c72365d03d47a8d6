//! Reading and writing snapshot CSV files.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use pqc_model::{Cell, Table};

use crate::error::{ReconcileError, Result};

/// A snapshot as it is on disk, every field kept as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFile {
    /// `None` when the file is empty.
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl SnapshotFile {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header: Some(header),
            rows,
        }
    }

    /// Renders a table the way [`write_snapshot`] would store it.
    pub fn from_table(table: &Table) -> Self {
        Self::new(
            table.columns().to_vec(),
            table.rows().iter().map(|row| render_row(row)).collect(),
        )
    }
}

fn render_row(row: &[Cell]) -> Vec<String> {
    row.iter().map(|cell| cell.render().into_owned()).collect()
}

/// Reads a snapshot without interpreting any field.
///
/// Rows may have a different width than the header; the diff decides what
/// that means.
pub fn read_snapshot(path: &Path) -> Result<SnapshotFile> {
    let read_err = |source: csv::Error| ReconcileError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut records = reader.records();
    let header: Option<Vec<String>> = match records.next() {
        Some(record) => Some(
            record
                .map_err(read_err)?
                .iter()
                .map(|field| field.trim_matches('\u{feff}').to_string())
                .collect(),
        ),
        None => None,
    };
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in records {
        let record = record.map_err(read_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(SnapshotFile { header, rows })
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).terminator(Terminator::Any(b'\n'));
    builder
}

/// Writes header and rows to `path`, replacing any existing file.
///
/// The content goes to a hidden sibling first and is renamed into place, so
/// an interrupted write leaves the previous snapshot intact.
pub fn write_snapshot(path: &Path, table: &Table) -> Result<()> {
    let temp_path = temp_sibling(path);
    let result = write_then_rename(path, &temp_path, table);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(path: &Path, temp_path: &Path, table: &Table) -> Result<()> {
    let write_err = |source: csv::Error| ReconcileError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(temp_path).map_err(|e| write_err(e.into()))?;
    let mut writer = writer_builder().from_writer(file);
    writer.write_record(table.columns()).map_err(write_err)?;
    for row in table.rows() {
        writer.write_record(render_row(row)).map_err(write_err)?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| write_err(e.into_error().into()))?;
    file.sync_all().map_err(|e| write_err(e.into()))?;
    drop(file);

    fs::rename(temp_path, path).map_err(|source| ReconcileError::Replace {
        temp_path: temp_path.to_path_buf(),
        target_path: path.to_path_buf(),
        source,
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Appends the selected rows to an existing snapshot, without a header.
pub fn append_rows(path: &Path, table: &Table, indices: &[usize]) -> Result<()> {
    let write_err = |source: csv::Error| ReconcileError::SnapshotWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| write_err(e.into()))?;

    // A hand-edited file may lack the final newline.
    if needs_line_break(&mut file).map_err(|e| write_err(e.into()))? {
        file.write_all(b"\n").map_err(|e| write_err(e.into()))?;
    }

    let mut writer = writer_builder().from_writer(file);
    for &idx in indices {
        if let Some(row) = table.rows().get(idx) {
            writer.write_record(render_row(row)).map_err(write_err)?;
        }
    }
    writer.flush().map_err(|e| write_err(e.into()))?;
    Ok(())
}

fn needs_line_break(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
