//! Database access for the snapshot pipeline.
//!
//! This crate owns everything that touches SQLite files:
//!
//! - **Queries**: run parameterized reads against a database file and return
//!   a [`Table`](pqc_model::Table) of typed cells
//! - **Projects**: list the projects active within the monitoring window and
//!   fetch the per-project Primary and Metadata rows
//! - **Copy sync**: replace a working copy with its external source of record
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pqc_db::{active_project_ids, sync_database};
//!
//! if sync_database(Path::new("/external/Metadata.sqlite"), Path::new("Metadata.sqlite")) {
//!     let now = chrono::Local::now().naive_local();
//!     let projects = active_project_ids(Path::new("Metadata.sqlite"), 30, now)?;
//! }
//! ```

mod copy;
mod error;
mod projects;
mod query;

pub use copy::{sync_database, try_sync_database};
pub use error::{DbError, Result, SyncError};
pub use projects::{
    DEFAULT_PRIMARY_COLUMNS, METADATA_KEY_COLUMN, METADATA_PROJECT_COLUMN, METADATA_TABLE,
    METADATA_TIMESTAMP_COLUMN, PRIMARY_KEY_COLUMN, PRIMARY_TABLE, active_project_ids,
    default_primary_columns, metadata_rows, monitoring_cutoff, primary_rows,
};
pub use query::{query, quote_identifier, table_names};
