//! Storage interfaces used by the daily job.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::PersistenceError;
use crate::models::Subscription;

/// Source of alert subscribers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Returns every active subscription. An absent store yields none.
    async fn load(&self) -> Result<Vec<Subscription>, PersistenceError>;
}
