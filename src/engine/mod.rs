//! The detection pipeline: diffing snapshots, applying the recency window
//! and routing the result to subscribers.

pub mod alert_dispatcher;
pub mod daily_job;
pub mod differ;
pub mod recency;
