//! Error types for model construction.

use thiserror::Error;

/// Errors raised while building model values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The sample name has no usable stem.
    #[error("cannot derive a project id from an empty sample name")]
    EmptySampleName,

    /// A table row does not match the header width.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
