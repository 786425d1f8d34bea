//! File-backed storage: dated snapshot files and the subscriber list.

pub mod error;
mod snapshot_store;
mod subscriptions;
pub mod traits;

pub use snapshot_store::SnapshotStore;
pub use subscriptions::CsvSubscriptionStore;
