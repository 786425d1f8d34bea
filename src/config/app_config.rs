use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{MailerConfig, ProducerConfig, deserialize_duration_from_seconds};
use crate::models::NotificationMessage;

/// Provides the default value for data_dir.
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Provides the default value for recency_window_days.
fn default_recency_window_days() -> u32 {
    30
}

/// Provides the default value for subscriptions_path.
fn default_subscriptions_path() -> PathBuf {
    PathBuf::from("alert_subscriptions.csv")
}

/// Provides the default value for send_timeout_secs.
fn default_send_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Application configuration for the daily monitor.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Directory holding the dated snapshot and new-records files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Trailing window, in days, a new record must fall inside.
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: u32,

    /// CSV file listing alert subscribers.
    #[serde(default = "default_subscriptions_path")]
    pub subscriptions_path: PathBuf,

    /// Upper bound on a single mailer call.
    #[serde(
        default = "default_send_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub send_timeout_secs: Duration,

    /// How alerts are delivered.
    #[serde(default)]
    pub mailer: MailerConfig,

    /// Subject and body templates for alert emails.
    #[serde(default)]
    pub alert_template: NotificationMessage,

    /// External snapshot producer. When absent the job expects today's
    /// snapshot to already be in `data_dir`.
    #[serde(default)]
    pub producer: Option<ProducerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            recency_window_days: default_recency_window_days(),
            subscriptions_path: default_subscriptions_path(),
            send_timeout_secs: default_send_timeout(),
            mailer: MailerConfig::default(),
            alert_template: NotificationMessage::default(),
            producer: None,
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` from `<config_dir>/app.yaml` (optional) and
    /// `PERMITMINDER__*` environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{config_dir_str}/app.yaml")).required(false))
            .add_source(
                Environment::with_prefix("PERMITMINDER").separator("__").try_parsing(true),
            )
            .build()?;
        s.try_deserialize()
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    pub fn subscriptions_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.subscriptions_path = path.into();
        self
    }

    pub fn recency_window_days(mut self, days: u32) -> Self {
        self.config.recency_window_days = days;
        self
    }

    pub fn producer(mut self, producer: ProducerConfig) -> Self {
        self.config.producer = Some(producer);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
