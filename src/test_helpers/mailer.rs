use std::{collections::HashSet, sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::mailer::{Mailer, error::MailerError};

/// One message captured by `RecordingMailer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    /// Recipient address.
    pub recipient: String,
    /// Rendered subject.
    pub subject: String,
    /// Rendered body.
    pub body: String,
}

/// A mailer that keeps every accepted message in memory.
///
/// Sends to recipients registered with `failing_for` return
/// `MailerError::SendFailed`; `with_delay` makes every send sleep first so
/// timeouts can be exercised.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingMailer {
    /// Creates a mailer that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sends to `recipient` fail.
    pub fn failing_for(mut self, recipient: &str) -> Self {
        self.failing.insert(recipient.to_string());
        self
    }

    /// Sleeps for `delay` before handling each send.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(recipient) {
            return Err(MailerError::SendFailed(format!("rejected {recipient}")));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| MailerError::InternalError(format!("poisoned: {e}")))?;
        sent.push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
