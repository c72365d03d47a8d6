//! Keeping working copies and snapshots in step with the external databases.
//!
//! The pieces, from the filesystem inwards:
//!
//! - [`WatchStrategy`] / [`PollingWatchStrategy`]: observe one external file
//!   and push a [`ChangeEvent`](pqc_model::ChangeEvent) when it changes
//! - [`ChangeEventQueue`]: many producers, one consumer, owned by the
//!   composition root
//! - [`SyncCoordinator`]: pops events, syncs the changed database, and
//!   reconciles all snapshots
//! - [`run_sweeper`]: periodic retention sweep
//! - [`Runtime`]: the startup sequence and clean shutdown of all of the above
//!
//! Every loop observes one [`ShutdownSignal`].

mod coordinator;
mod error;
mod queue;
mod runtime;
mod shutdown;
mod sweeper;
mod watch;

pub use coordinator::{
    CoordinatorState, CoordinatorStats, DEFAULT_POP_TIMEOUT, EventOutcome, SyncCoordinator,
};
pub use error::{RuntimeError, WatchError};
pub use queue::{ChangeEventQueue, ChangeReceiver, ChangeSender};
pub use runtime::{Runtime, RuntimeReport, SyncSettings};
pub use shutdown::ShutdownSignal;
pub use sweeper::run_sweeper;
pub use watch::{DEFAULT_POLL_INTERVAL, PollingWatchStrategy, WatchHandle, WatchStrategy};
