//! Routes new exceedances to the subscribers monitoring their permits.

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;

use crate::{
    mailer::{AlertComposer, Mailer, error::MailerError},
    models::{DispatchSummary, ExceedanceRecord, Subscription},
};

/// Sends one combined alert per interested subscriber.
pub struct AlertDispatcher {
    /// The mail-sending collaborator.
    mailer: Arc<dyn Mailer>,

    /// Renders subject and body for each subscriber.
    composer: AlertComposer,

    /// Upper bound on a single mailer call.
    send_timeout: Duration,
}

impl AlertDispatcher {
    /// Creates a new dispatcher.
    pub fn new(mailer: Arc<dyn Mailer>, composer: AlertComposer, send_timeout: Duration) -> Self {
        Self { mailer, composer, send_timeout }
    }

    /// Sends each subscriber the records of `date` for the permits they
    /// monitor.
    ///
    /// Subscribers with no matching records are skipped. A failed, timed out
    /// or uncomposable send is recorded against that subscriber only; the
    /// remaining subscribers are still processed.
    pub async fn dispatch(
        &self,
        date: NaiveDate,
        records: &[&ExceedanceRecord],
        subscriptions: &[Subscription],
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for subscription in subscriptions {
            let matching: Vec<&ExceedanceRecord> =
                records.iter().copied().filter(|r| subscription.monitors(&r.permit)).collect();

            if matching.is_empty() {
                tracing::debug!(recipient = %subscription.email, "No new exceedances for subscriber.");
                summary.skipped += 1;
                continue;
            }

            summary.attempted += 1;
            match self.deliver(subscription, date, &matching).await {
                Ok(()) => {
                    tracing::info!(
                        recipient = %subscription.email,
                        records = matching.len(),
                        "Alert sent."
                    );
                    summary.sent += 1;
                }
                Err(e) => {
                    tracing::error!(
                        recipient = %subscription.email,
                        records = matching.len(),
                        error = %e,
                        "Failed to send alert."
                    );
                    summary.failed.push(subscription.email.clone());
                }
            }
        }

        tracing::info!(
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Alerts: {summary}."
        );
        summary
    }

    async fn deliver(
        &self,
        subscription: &Subscription,
        date: NaiveDate,
        records: &[&ExceedanceRecord],
    ) -> Result<(), MailerError> {
        let alert = self.composer.compose(subscription, date, records)?;
        tokio::time::timeout(
            self.send_timeout,
            self.mailer.send(&subscription.email, &alert.subject, &alert.body),
        )
        .await
        .map_err(|_| MailerError::Timeout(self.send_timeout))?
    }
}
