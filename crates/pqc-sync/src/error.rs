//! Error types for watching and the runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Errors starting a watcher. Always fatal at startup.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The directory holding the tracked file does not exist.
    #[error("watch directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("tracked path has no file name: {path}")]
    NoFileName { path: PathBuf },

    #[error("failed to watch {path}: {source}")]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Errors that prevent the runtime from starting.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error("failed to prepare output directory: {0}")]
    OutputDir(#[source] pqc_snapshot::ReconcileError),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::DirectoryNotFound {
            path: PathBuf::from("/external_Meta_database"),
        };
        assert_eq!(
            err.to_string(),
            "watch directory not found: /external_Meta_database"
        );
        let runtime: RuntimeError = err.into();
        assert!(matches!(runtime, RuntimeError::Watch(_)));
    }
}
