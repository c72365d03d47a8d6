//! Snapshot file naming.

use std::path::{Path, PathBuf};

use pqc_model::ProjectId;

pub const SNAPSHOT_SUFFIX: &str = "_ProjectData.csv";

/// `<output_dir>/<ProjectID>_ProjectData.csv`
pub fn snapshot_path(output_dir: &Path, project: &ProjectId) -> PathBuf {
    output_dir.join(format!("{}{SNAPSHOT_SUFFIX}", project.as_str()))
}

/// Project id encoded in a snapshot file name, `None` for any other file.
pub fn snapshot_project_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SNAPSHOT_SUFFIX)
        .filter(|name| !name.is_empty())
}
