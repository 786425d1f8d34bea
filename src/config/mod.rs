//! Configuration for the PermitMinder daily monitor.

mod app_config;
mod helpers;
mod http_client;
mod http_retry;
mod mailer;
mod producer;

pub use app_config::AppConfig;
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, serialize_duration_to_ms,
    serialize_duration_to_seconds,
};
pub use http_client::HttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use mailer::{MailerConfig, WebhookMailerConfig};
pub use producer::ProducerConfig;
