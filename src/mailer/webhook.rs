//! Delivery through an HTTP mail relay.
//!
//! Each alert is POSTed as `{ "to", "subject", "body" }` JSON to the relay,
//! optionally signed with an HMAC-SHA256 of the payload and a timestamp.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{
    Method,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use reqwest_middleware::ClientWithMiddleware;
use serde_json::json;
use sha2::Sha256;
use url::Url;

use super::{error::MailerError, traits::Mailer};
use crate::config::WebhookMailerConfig;

/// HMAC SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

/// Sends alert emails by calling a mail relay webhook.
#[derive(Debug)]
pub struct WebhookMailer {
    /// Relay endpoint.
    url: Url,
    /// HTTP client with retry middleware.
    client: Arc<ClientWithMiddleware>,
    /// HTTP method, POST unless configured otherwise.
    method: Method,
    /// Secret used to sign payloads.
    secret: Option<String>,
    /// Extra request headers.
    headers: HashMap<String, String>,
}

impl WebhookMailer {
    /// Creates a new relay mailer.
    pub fn new(
        config: WebhookMailerConfig,
        http_client: Arc<ClientWithMiddleware>,
    ) -> Result<Self, MailerError> {
        let method = match config.method.as_deref() {
            Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .map_err(|e| MailerError::ConfigError(format!("Invalid HTTP method {m}: {e}")))?,
            None => Method::POST,
        };
        Ok(Self {
            url: config.url,
            client: http_client,
            method,
            secret: config.secret,
            headers: config.headers.unwrap_or_default(),
        })
    }

    /// Signs `payload` with `secret`, returning the hex signature and the
    /// millisecond timestamp that was signed alongside it.
    pub fn sign_payload(
        &self,
        secret: &str,
        payload: &serde_json::Value,
    ) -> Result<(String, String), MailerError> {
        // `new_from_slice` accepts empty keys
        if secret.is_empty() {
            return Err(MailerError::ConfigError("Invalid secret: cannot be empty.".to_string()));
        }

        let timestamp = Utc::now().timestamp_millis();

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| MailerError::ConfigError(format!("Invalid secret: {e}")))?;

        let serialized_payload = serde_json::to_string(payload).map_err(|e| {
            MailerError::InternalError(format!("Failed to serialize payload: {e}"))
        })?;
        mac.update(format!("{serialized_payload}{timestamp}").as_bytes());

        let signature = hex::encode(mac.finalize().into_bytes());

        Ok((signature, timestamp.to_string()))
    }

    fn build_headers(&self, payload: &serde_json::Value) -> Result<HeaderMap, MailerError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/json"),
        );

        if let Some(secret) = &self.secret {
            let (signature, timestamp) = self.sign_payload(secret, payload)?;
            headers.insert(
                HeaderName::from_static("x-signature"),
                HeaderValue::from_str(&signature).map_err(|e| {
                    MailerError::SendFailed(format!("Invalid signature value: {e}"))
                })?,
            );
            headers.insert(
                HeaderName::from_static("x-timestamp"),
                HeaderValue::from_str(&timestamp).map_err(|e| {
                    MailerError::SendFailed(format!("Invalid timestamp value: {e}"))
                })?,
            );
        }

        for (key, value) in &self.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                MailerError::ConfigError(format!("Invalid header name: {key}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                MailerError::ConfigError(format!("Invalid header value for {key}: {value}: {e}"))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let payload = json!({ "to": recipient, "subject": subject, "body": body });
        let headers = self.build_headers(&payload)?;

        let response = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(headers)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailerError::SendFailed(format!(
                "Mail relay responded with status: {status}"
            )));
        }

        tracing::debug!(%recipient, %status, "Mail relay accepted alert.");
        Ok(())
    }
}
