//! Error types for snapshot reconciliation and retention.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail the reconciliation of one project, or the listing of
/// active projects.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Db(#[from] pqc_db::DbError),

    /// A column the join depends on is absent from a query result.
    #[error("{table} result has no {column} column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error(transparent)]
    Model(#[from] pqc_model::ModelError),

    #[error("failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The rewritten snapshot could not replace the old one.
    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    Replace {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// The on-disk snapshot could not be compared with the fresh rows.
///
/// Never fatal: the reconciler answers with a full rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("row {line} has {actual} fields, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("key column {column} not found")]
    MissingKey { column: String },
}

/// Errors that abort a retention sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Active projects could not be determined, so nothing is deleted.
    #[error("failed to list active projects: {0}")]
    ActiveProjects(#[source] pqc_db::DbError),
}
