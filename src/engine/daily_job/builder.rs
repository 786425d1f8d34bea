//! This module provides the `DailyJobBuilder` for constructing a `DailyJob`.

use std::sync::Arc;

use super::{DailyJob, DailyJobError};
use crate::{
    config::AppConfig,
    engine::{alert_dispatcher::AlertDispatcher, differ::SnapshotDiffer, recency::RecencyFilter},
    mailer::{AlertComposer, Mailer, build_mailer},
    persistence::{CsvSubscriptionStore, SnapshotStore, traits::SubscriptionStore},
    producer::SnapshotProducer,
};

/// A builder for creating a `DailyJob` instance.
///
/// Only the configuration is required. The mailer and the subscription store
/// default to the ones described by the configuration.
#[derive(Default)]
pub struct DailyJobBuilder {
    config: Option<AppConfig>,
    mailer: Option<Arc<dyn Mailer>>,
    subscriptions: Option<Arc<dyn SubscriptionStore>>,
}

impl DailyJobBuilder {
    /// Creates a new, empty `DailyJobBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the mailer built from the configuration.
    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Overrides the subscription store built from the configuration.
    pub fn subscriptions(mut self, subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    /// Wires the pipeline stages together.
    pub fn build(self) -> Result<DailyJob, DailyJobError> {
        let config = self.config.ok_or(DailyJobError::MissingConfig)?;

        let mailer = match self.mailer {
            Some(mailer) => mailer,
            None => build_mailer(&config.mailer)?,
        };
        let subscriptions = self.subscriptions.unwrap_or_else(|| {
            Arc::new(CsvSubscriptionStore::new(config.subscriptions_path.clone()))
        });
        let producer = config.producer.clone().map(SnapshotProducer::new).transpose()?;

        tracing::debug!(
            data_dir = %config.data_dir.display(),
            window_days = config.recency_window_days,
            producer = producer.is_some(),
            "Daily job configured."
        );

        Ok(DailyJob {
            store: SnapshotStore::new(config.data_dir.clone()),
            differ: SnapshotDiffer::new(RecencyFilter::new(config.recency_window_days)),
            producer,
            subscriptions,
            dispatcher: AlertDispatcher::new(
                mailer,
                AlertComposer::new(config.alert_template.clone()),
                config.send_timeout_secs,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use super::*;
    use crate::config::{MailerConfig, ProducerConfig, WebhookMailerConfig};

    #[test]
    fn build_fails_if_config_is_missing() {
        let result = DailyJobBuilder::new().build();
        assert!(matches!(result, Err(DailyJobError::MissingConfig)));
    }

    #[test]
    fn build_uses_configured_defaults() {
        let config = AppConfig::builder().data_dir("/tmp/permitminder-data").build();
        let job = DailyJobBuilder::new().config(config).build().unwrap();
        assert_eq!(job.store().data_dir(), PathBuf::from("/tmp/permitminder-data"));
    }

    #[test]
    fn build_fails_on_empty_producer_command() {
        let config = AppConfig::builder()
            .producer(ProducerConfig {
                command: vec![],
                output_path: PathBuf::from("out.csv"),
                timeout_secs: Duration::from_secs(1),
            })
            .build();
        let result = DailyJobBuilder::new().config(config).build();
        assert!(matches!(result, Err(DailyJobError::Producer(_))));
    }

    #[test]
    fn build_fails_on_invalid_webhook_method() {
        let mut config = AppConfig::default();
        config.mailer = MailerConfig::Webhook(WebhookMailerConfig {
            url: "https://relay.example.com".parse().unwrap(),
            method: Some("NOT A METHOD".to_string()),
            secret: None,
            headers: None,
            retry_policy: Default::default(),
            http_client: Default::default(),
        });
        let result = DailyJobBuilder::new().config(config).build();
        assert!(matches!(result, Err(DailyJobError::Mailer(_))));
    }
}
