//! Error types for database access and working-copy sync.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a database.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be opened.
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to prepare or execute.
    #[error("query failed on {path}: {source}")]
    Query {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A result row did not fit the column layout.
    #[error("malformed result from {path}: {source}")]
    Row {
        path: PathBuf,
        #[source]
        source: pqc_model::ModelError,
    },
}

/// Result type for database reads.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised while copying a database onto its working copy.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source of record does not exist.
    #[error("source database not found: {path}")]
    SourceMissing { path: PathBuf },

    /// The source exists but is not a regular file.
    #[error("source database is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// A filesystem step failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished copy could not replace the working copy.
    #[error("failed to replace {target_path} with {temp_path}: {source}")]
    Replace {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
