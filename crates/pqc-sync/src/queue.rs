//! The change-event queue between watchers and the coordinator.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use pqc_model::ChangeEvent;

/// Constructor for a multi-producer, single-consumer queue of change events.
///
/// Events are delivered in push order and never deduplicated.
pub struct ChangeEventQueue;

impl ChangeEventQueue {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (ChangeSender, ChangeReceiver) {
        let (tx, rx) = mpsc::channel();
        (ChangeSender { tx }, ChangeReceiver { rx })
    }
}

/// Producer side; clone one per watcher.
#[derive(Debug, Clone)]
pub struct ChangeSender {
    tx: mpsc::Sender<ChangeEvent>,
}

impl ChangeSender {
    /// Enqueues an event. Returns `false` once the consumer is gone.
    pub fn push(&self, event: ChangeEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Consumer side; exactly one exists per queue.
#[derive(Debug)]
pub struct ChangeReceiver {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl ChangeReceiver {
    /// Waits up to `timeout` for the next event.
    ///
    /// A queue whose producers are all gone behaves like an empty one.
    pub fn pop(&self, timeout: Duration) -> Option<ChangeEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                None
            }
        }
    }

    /// Takes every event queued right now without blocking.
    pub fn try_drain(&self) -> Vec<ChangeEvent> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_fifo_across_producers() {
        let (tx, rx) = ChangeEventQueue::new();
        let other = tx.clone();
        assert!(tx.push(ChangeEvent::new("a")));
        assert!(other.push(ChangeEvent::new("b")));
        assert!(tx.push(ChangeEvent::new("a")));

        let popped: Vec<_> = (0..3)
            .filter_map(|_| rx.pop(Duration::from_millis(10)))
            .map(|e| e.source_path)
            .collect();
        assert_eq!(popped, ["a", "b", "a"].map(std::path::PathBuf::from));
    }

    #[test]
    fn test_pop_times_out() {
        let (_tx, rx) = ChangeEventQueue::new();
        let start = Instant::now();
        assert!(rx.pop(Duration::from_millis(50)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_producers_from_threads() {
        let (tx, rx) = ChangeEventQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tx = tx.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        tx.push(ChangeEvent::new(format!("db{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(rx.try_drain().len(), 40);
        assert!(rx.try_drain().is_empty());
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (tx, rx) = ChangeEventQueue::new();
        drop(rx);
        assert!(!tx.push(ChangeEvent::new("a")));
    }
}
