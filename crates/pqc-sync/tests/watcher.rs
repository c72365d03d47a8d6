//! Polling watcher behavior on a real directory.

mod support;

use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use pqc_sync::{ChangeEventQueue, PollingWatchStrategy, WatchError, WatchStrategy};
use support::bump_mtime;
use tempfile::TempDir;

const POLL: Duration = Duration::from_millis(100);

#[test]
fn modification_pushes_tracked_path() {
    let dir = TempDir::new().unwrap();
    let tracked = dir.path().join("Metadata.sqlite");
    fs::write(&tracked, "v0").unwrap();

    let (sender, receiver) = ChangeEventQueue::new();
    let handle = PollingWatchStrategy::new(POLL).start(&tracked, sender).unwrap();
    assert_eq!(handle.tracked(), tracked.as_path());

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut step = 0;
    let event = loop {
        step += 1;
        fs::write(&tracked, format!("v{step}")).unwrap();
        bump_mtime(&tracked, 2 * step);
        if let Some(event) = receiver.pop(Duration::from_millis(300)) {
            break Some(event);
        }
        if Instant::now() > deadline {
            break None;
        }
    };

    let event = event.expect("change observed within 10 s");
    assert_eq!(event.source_path, tracked);
}

#[test]
fn sibling_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    let tracked = dir.path().join("Metadata.sqlite");
    let sibling = dir.path().join("other.sqlite");
    fs::write(&tracked, "v0").unwrap();
    fs::write(&sibling, "v0").unwrap();

    let (sender, receiver) = ChangeEventQueue::new();
    let _handle = PollingWatchStrategy::new(POLL).start(&tracked, sender).unwrap();

    for step in 1..=5 {
        fs::write(&sibling, format!("v{step}")).unwrap();
        bump_mtime(&sibling, 2 * step);
        thread::sleep(POLL);
    }
    assert!(receiver.pop(Duration::from_millis(500)).is_none());
}

#[test]
fn dropping_the_handle_stops_polling() {
    let dir = TempDir::new().unwrap();
    let tracked = dir.path().join("Metadata.sqlite");
    fs::write(&tracked, "v0").unwrap();

    let (sender, receiver) = ChangeEventQueue::new();
    let handle = PollingWatchStrategy::new(POLL).start(&tracked, sender).unwrap();
    drop(handle);
    thread::sleep(POLL * 5);
    receiver.try_drain();

    fs::write(&tracked, "v1").unwrap();
    bump_mtime(&tracked, 10);
    assert!(receiver.pop(POLL * 6).is_none());
}

#[test]
fn missing_directory_fails_to_start() {
    let dir = TempDir::new().unwrap();
    let (sender, _receiver) = ChangeEventQueue::new();
    let err = PollingWatchStrategy::new(POLL)
        .start(&dir.path().join("external_Meta_database/Metadata.sqlite"), sender)
        .unwrap_err();
    assert!(matches!(err, WatchError::DirectoryNotFound { .. }));
}
