//! This module contains the data models for PermitMinder.

pub mod exceedance;
pub mod notification;
pub mod report;
pub mod snapshot;
pub mod subscription;

pub use exceedance::{ExceedanceKey, ExceedanceRecord, IdentityHash, Severity};
pub use notification::NotificationMessage;
pub use report::{DailyRunReport, DispatchSummary};
pub use snapshot::{DiffBaseline, NewRecordSet, Snapshot, SnapshotEntry};
pub use subscription::{Frequency, Subscription};
