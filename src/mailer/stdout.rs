use async_trait::async_trait;

use super::{error::MailerError, traits::Mailer};

/// A mailer that prints each message to standard output instead of sending
/// it.
#[derive(Debug, Default)]
pub struct StdoutMailer;

#[async_trait]
impl Mailer for StdoutMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        println!("=== To: {recipient} ===\nSubject: {subject}\n\n{body}\n");
        Ok(())
    }
}
