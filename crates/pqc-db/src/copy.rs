//! Working-copy synchronization.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Copies `source` over `dest`, returning the number of bytes copied.
///
/// The copy is written to a hidden sibling of `dest`, given the source's
/// permissions and modification time, then renamed into place. Readers of
/// `dest` see either the old file or the complete new one.
pub fn try_sync_database(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    let metadata = match fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SyncError::SourceMissing {
                path: source.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(SyncError::Io {
                operation: "stat",
                path: source.to_path_buf(),
                source: e,
            });
        }
    };
    if !metadata.is_file() {
        return Err(SyncError::NotAFile {
            path: source.to_path_buf(),
        });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SyncError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_sibling(dest);
    let result = copy_into_place(source, dest, &temp_path, &metadata);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn copy_into_place(
    source: &Path,
    dest: &Path,
    temp_path: &Path,
    metadata: &fs::Metadata,
) -> Result<u64, SyncError> {
    // fs::copy carries the permission bits over.
    let bytes = fs::copy(source, temp_path).map_err(|e| SyncError::Io {
        operation: "copy",
        path: source.to_path_buf(),
        source: e,
    })?;

    let file = File::options()
        .write(true)
        .open(temp_path)
        .map_err(|e| SyncError::Io {
            operation: "open",
            path: temp_path.to_path_buf(),
            source: e,
        })?;
    if let Ok(modified) = metadata.modified() {
        file.set_modified(modified).map_err(|e| SyncError::Io {
            operation: "set modification time of",
            path: temp_path.to_path_buf(),
            source: e,
        })?;
    }
    file.sync_all().map_err(|e| SyncError::Io {
        operation: "sync",
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| SyncError::Replace {
        temp_path: temp_path.to_path_buf(),
        target_path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(bytes)
}

fn temp_sibling(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "database".to_string());
    dest.with_file_name(format!(".{name}.sync-tmp"))
}

/// Replaces the working copy with the source of record.
///
/// Returns `false` when the source is missing (logged as a warning) or any
/// filesystem step fails (logged as an error). Never panics.
pub fn sync_database(source: &Path, dest: &Path) -> bool {
    match try_sync_database(source, dest) {
        Ok(bytes) => {
            tracing::info!(
                source = %source.display(),
                dest = %dest.display(),
                bytes,
                "database synced"
            );
            true
        }
        Err(SyncError::SourceMissing { path }) => {
            tracing::warn!(source = %path.display(), "source database missing, sync skipped");
            false
        }
        Err(error) => {
            tracing::error!(
                source = %source.display(),
                dest = %dest.display(),
                %error,
                "database sync failed"
            );
            false
        }
    }
}
