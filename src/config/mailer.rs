use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use super::{HttpClientConfig, HttpRetryConfig};

/// Selects how alerts are delivered.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MailerConfig {
    /// Print alerts to standard output.
    #[default]
    Stdout,
    /// POST alerts to an HTTP mail relay.
    Webhook(WebhookMailerConfig),
}

/// Mail relay settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WebhookMailerConfig {
    /// Relay endpoint.
    pub url: Url,
    /// HTTP method, POST when absent.
    #[serde(default)]
    pub method: Option<String>,
    /// Secret for HMAC-SHA256 payload signing.
    #[serde(default)]
    pub secret: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Retry policy for transient relay failures.
    #[serde(default)]
    pub retry_policy: HttpRetryConfig,
    /// Settings for the underlying HTTP client.
    #[serde(default)]
    pub http_client: HttpClientConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdout_is_the_default() {
        assert_eq!(MailerConfig::default(), MailerConfig::Stdout);
        let parsed: MailerConfig = serde_json::from_str(r#"{ "type": "stdout" }"#).unwrap();
        assert_eq!(parsed, MailerConfig::Stdout);
    }

    #[test]
    fn webhook_needs_only_a_url() {
        let parsed: MailerConfig =
            serde_json::from_str(r#"{ "type": "webhook", "url": "https://relay.example.com/send" }"#)
                .unwrap();
        let MailerConfig::Webhook(webhook) = parsed else {
            panic!("expected webhook config");
        };
        assert_eq!(webhook.url.as_str(), "https://relay.example.com/send");
        assert!(webhook.secret.is_none());
        assert_eq!(webhook.retry_policy, HttpRetryConfig::default());
        assert_eq!(webhook.http_client, HttpClientConfig::default());
    }

    #[test]
    fn webhook_with_invalid_url_is_rejected() {
        let result: Result<MailerConfig, _> =
            serde_json::from_str(r#"{ "type": "webhook", "url": "not a url" }"#);
        assert!(result.is_err());
    }
}
