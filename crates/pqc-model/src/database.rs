//! Watched databases and the change events raised for them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Which of the two source databases a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    /// Instrument QC metrics (`SingleFileReport`).
    Primary,
    /// Sample metadata (`Metadata_Sample`).
    Metadata,
}

impl DatabaseKind {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An externally mounted database and its internal working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedDatabase {
    pub kind: DatabaseKind,
    /// Source of record; the file that is watched.
    pub external: PathBuf,
    /// Working copy the pipeline reads from.
    pub working: PathBuf,
    /// Substring identifying change events for this database.
    pub marker: String,
}

impl WatchedDatabase {
    /// Creates a watched database whose marker is the external path itself.
    pub fn new(kind: DatabaseKind, external: impl Into<PathBuf>, working: impl Into<PathBuf>) -> Self {
        let external = external.into();
        let marker = external.to_string_lossy().into_owned();
        Self {
            kind,
            external,
            working: working.into(),
            marker,
        }
    }

    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// True when the event path contains this database's marker.
    pub fn owns(&self, path: &Path) -> bool {
        !self.marker.is_empty() && path.to_string_lossy().contains(self.marker.as_str())
    }
}

/// Notification that a watched file was modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub source_path: PathBuf,
}

impl ChangeEvent {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
        }
    }
}
