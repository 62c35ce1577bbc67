//! Waiting for a HelmRequest to converge

pub mod budget;
pub mod clock;
pub mod watcher;

pub use budget::{FailureBudget, WatchState, DEFAULT_FAILURE_TOLERANCE};
pub use clock::{Clock, ManualClock, TokioClock};
pub use watcher::{RequestAction, WatchError, WatchOptions, WatchTarget, Watcher};
