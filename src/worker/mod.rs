//! Offline resource cache worker.
//!
//! This module keeps the application usable without a network: a
//! versioned set of disk cache partitions, an install/activate lifecycle,
//! and per-request fetch strategies (cache-first for the static shell,
//! stale-while-revalidate for cross-origin resources, network-first for
//! same-origin dynamic content).

pub mod error;
pub mod manager;
pub mod notifications;
pub mod request;

pub use error::WorkerError;
pub use manager::{
    FetchOutcome, OfflineWorker, Partition, ServedFrom, WorkerCommand, WorkerState, VERSION,
};
pub use notifications::{ClickAction, Notification, PushPayload, WindowAction};
pub use request::{Destination, FetchRequest};
