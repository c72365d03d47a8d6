//! Observing external database files for changes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use pqc_model::ChangeEvent;
use tracing::{debug, info, warn};

use crate::error::WatchError;
use crate::queue::ChangeSender;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A way of noticing that a tracked file changed.
///
/// Implementations push one [`ChangeEvent`] carrying the tracked path per
/// observed change, must not block the caller, and stop observing when the
/// returned handle is dropped.
pub trait WatchStrategy: Send + Sync {
    fn start(&self, tracked: &Path, sender: ChangeSender) -> Result<WatchHandle, WatchError>;
}

/// Keeps a watcher alive; dropping it stops the watch.
pub struct WatchHandle {
    tracked: PathBuf,
    _guard: Box<dyn Send>,
}

impl WatchHandle {
    pub fn new(tracked: impl Into<PathBuf>, guard: impl Send + 'static) -> Self {
        Self {
            tracked: tracked.into(),
            _guard: Box::new(guard),
        }
    }

    pub fn tracked(&self) -> &Path {
        &self.tracked
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("tracked", &self.tracked)
            .finish_non_exhaustive()
    }
}

/// Polls the tracked file's directory every `interval`.
///
/// Polling works on network mounts where OS notifications are unreliable.
#[derive(Debug, Clone, Copy)]
pub struct PollingWatchStrategy {
    interval: Duration,
}

impl PollingWatchStrategy {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PollingWatchStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl WatchStrategy for PollingWatchStrategy {
    fn start(&self, tracked: &Path, sender: ChangeSender) -> Result<WatchHandle, WatchError> {
        let file_name = tracked
            .file_name()
            .ok_or_else(|| WatchError::NoFileName {
                path: tracked.to_path_buf(),
            })?
            .to_os_string();
        let dir = match tracked.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            return Err(WatchError::DirectoryNotFound { path: dir });
        }
        // Poll events carry the watched root as prefix; watch the canonical
        // directory so they compare equal to `expected`.
        let dir = dir.canonicalize().map_err(|_| WatchError::DirectoryNotFound {
            path: dir.clone(),
        })?;
        let expected = dir.join(&file_name);

        let reported = tracked.to_path_buf();
        let handler = move |result: notify::Result<Event>| match result {
            Ok(event) => {
                if is_change(&event.kind) && event.paths.iter().any(|p| p == &expected) {
                    debug!(path = %reported.display(), kind = ?event.kind, "change observed");
                    if !sender.push(ChangeEvent::new(reported.clone())) {
                        debug!(path = %reported.display(), "queue closed, change dropped");
                    }
                }
            }
            Err(error) => warn!(path = %reported.display(), %error, "watch error"),
        };

        let config = Config::default().with_poll_interval(self.interval);
        let mut watcher = PollWatcher::new(handler, config).map_err(|source| WatchError::Notify {
            path: dir.clone(),
            source,
        })?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Notify {
                path: dir.clone(),
                source,
            })?;

        info!(
            path = %tracked.display(),
            interval_secs = self.interval.as_secs_f64(),
            "watching for changes"
        );
        Ok(WatchHandle::new(tracked, watcher))
    }
}

fn is_change(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Modify(_) | EventKind::Create(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn test_is_change() {
        assert!(is_change(&EventKind::Modify(ModifyKind::Any)));
        assert!(is_change(&EventKind::Create(CreateKind::File)));
        assert!(!is_change(&EventKind::Remove(RemoveKind::File)));
        assert!(!is_change(&EventKind::Access(notify::event::AccessKind::Any)));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = crate::ChangeEventQueue::new();
        let err = PollingWatchStrategy::default()
            .start(&dir.path().join("absent").join("Metadata.sqlite"), tx)
            .unwrap_err();
        assert!(matches!(err, WatchError::DirectoryNotFound { .. }));
    }
}
