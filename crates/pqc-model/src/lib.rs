//! Project QC data model.
//!
//! Shared types for the snapshot sync pipeline:
//!
//! - **Project identifiers**: derive a `ProjectId` and its fuzzy patterns from
//!   a sample file name
//! - **Cells and tables**: typed values returned by database queries
//! - **Temporal columns**: the `Date`/`Time`/`DateTime` triple derived from a
//!   creation timestamp
//! - **Watched databases**: the Primary/Metadata pair and the change events
//!   raised for them
//!
//! # Example
//!
//! ```
//! use pqc_model::ProjectId;
//!
//! let id = ProjectId::from_sample_name("Astral_20250716_XYZ_HSdia_01").unwrap();
//! assert_eq!(id.as_str(), "Astral_20250716_XYZ");
//! assert_eq!(id.sql_pattern(), "Astral_202507__XYZ%");
//! ```

mod database;
mod error;
mod project;
mod table;
mod temporal;
mod value;

pub use database::{ChangeEvent, DatabaseKind, WatchedDatabase};
pub use error::{ModelError, Result};
pub use project::{ProjectId, is_standard_sample};
pub use table::Table;
pub use temporal::{
    DATE_COLUMN, DATE_TIME_COLUMN, SENTINEL_DATE, SENTINEL_DATE_TIME, SENTINEL_TIME,
    TEMPORAL_COLUMNS, TIME_COLUMN, TemporalColumns, parse_creation_timestamp,
};
pub use value::{Cell, parse_number};
