//! # Mailer
//!
//! The boundary between the alert dispatcher and whatever actually delivers
//! email.
//!
//! - **`Mailer` trait**: `send(recipient, subject, body)`, implemented by
//!   `StdoutMailer` (prints messages, for dry runs) and `WebhookMailer`
//!   (POSTs to an HTTP mail relay with retries and optional signing).
//! - **`AlertComposer`**: renders the subject and body of a combined alert
//!   from minijinja templates through the `TemplateService`.
//!
//! `build_mailer` selects the implementation from `MailerConfig`.

use std::sync::Arc;

use crate::{config::MailerConfig, http_client::create_http_client};

mod composer;
pub mod error;
mod stdout;
pub mod template;
mod traits;
mod webhook;

pub use composer::{AlertComposer, ComposedAlert};
use error::MailerError;
pub use stdout::StdoutMailer;
#[cfg(test)]
pub use traits::MockMailer;
pub use traits::Mailer;
pub use webhook::WebhookMailer;

/// Builds the mailer described by `config`.
pub fn build_mailer(config: &MailerConfig) -> Result<Arc<dyn Mailer>, MailerError> {
    match config {
        MailerConfig::Stdout => Ok(Arc::new(StdoutMailer)),
        MailerConfig::Webhook(webhook) => {
            let client = create_http_client(&webhook.retry_policy, &webhook.http_client)
                .map_err(|e| MailerError::ConfigError(e.to_string()))?;
            tracing::debug!(url = %webhook.url, "Using mail relay webhook.");
            Ok(Arc::new(WebhookMailer::new(webhook.clone(), Arc::new(client))?))
        }
    }
}
