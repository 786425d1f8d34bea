use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::error::MailerError;

/// The mail-sending collaborator used to deliver alerts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one email. `Ok(())` means the message was accepted for delivery.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}
