//! Error types for the mailer boundary.

use thiserror::Error;

use super::template::TemplateServiceError;

/// Defines the possible errors that can occur while composing or sending an
/// alert email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// An error related to invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The mail relay rejected or failed the send.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The send did not complete within the configured timeout.
    #[error("Send timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// An internal error that should not occur under normal circumstances.
    #[error("Internal error: {0}")]
    InternalError(String),

    /// An error from the underlying `reqwest` or `reqwest_middleware`
    /// libraries.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest_middleware::Error),

    /// An error related to the template rendering process.
    #[error("Template rendering error: {0}")]
    TemplateError(#[from] TemplateServiceError),
}
