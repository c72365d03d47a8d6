//! Per-project CSV snapshots.
//!
//! Each active project owns one `<ProjectID>_ProjectData.csv` in the output
//! directory. The [`Reconciler`] rebuilds the joined rows from the working
//! databases and brings each snapshot up to date with the cheapest safe write:
//!
//! - no file yet: write header and rows
//! - only new samples: append them, no header
//! - nothing new: leave the file untouched
//! - anything else: rewrite the whole file through a temporary sibling
//!
//! The decision is made by [`diff_snapshot`], a pure function over the
//! on-disk rows and the fresh join. [`RetentionSweeper`] deletes snapshots of
//! projects that dropped out of the monitoring window.

mod diff;
mod error;
mod join;
mod paths;
mod reconcile;
mod report;
mod snapshot;
mod sweep;

pub use diff::{ABSOLUTE_TOLERANCE, RELATIVE_TOLERANCE, RewriteReason, SnapshotDiff, diff_snapshot};
pub use error::{CompareError, ReconcileError, Result, SweepError};
pub use join::{METADATA_SUFFIX, PRIMARY_SUFFIX, join_project_rows, strip_raw_suffix};
pub use paths::{SNAPSHOT_SUFFIX, snapshot_path, snapshot_project_name};
pub use reconcile::Reconciler;
pub use report::{BatchReport, ProjectOutcome, SnapshotAction};
pub use snapshot::{SnapshotFile, append_rows, read_snapshot, write_snapshot};
pub use sweep::{RetentionSweeper, SweepReport};
