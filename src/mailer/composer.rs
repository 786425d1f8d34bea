//! Renders the combined alert message for one subscriber.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use super::{error::MailerError, template::TemplateService};
use crate::models::{ExceedanceRecord, NotificationMessage, Subscription};

/// The per-record fields exposed to alert templates.
#[derive(Debug, Serialize)]
struct RecordSummary<'a> {
    permit: &'a str,
    facility: &'a str,
    county: &'a str,
    date: &'a str,
    parameter: &'a str,
    sample_value: &'a str,
    permit_value: Option<&'a str>,
    unit: Option<&'a str>,
    severity: &'static str,
    percent_over_limit: Option<f64>,
}

impl<'a> From<&'a ExceedanceRecord> for RecordSummary<'a> {
    fn from(r: &'a ExceedanceRecord) -> Self {
        Self {
            permit: &r.permit,
            facility: &r.facility,
            county: &r.county,
            date: &r.non_compliance_date,
            parameter: &r.parameter,
            sample_value: &r.sample_value,
            permit_value: r.permit_value.as_deref(),
            unit: r.unit.as_deref(),
            severity: r.severity.as_str(),
            percent_over_limit: r.percent_over_limit,
        }
    }
}

/// A rendered alert, ready for the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedAlert {
    /// Email subject.
    pub subject: String,
    /// Email body.
    pub body: String,
}

/// Builds alert emails from the configured subject and body templates.
pub struct AlertComposer {
    templates: NotificationMessage,
    template_service: TemplateService,
}

impl AlertComposer {
    /// Creates a composer using `templates`.
    pub fn new(templates: NotificationMessage) -> Self {
        Self { templates, template_service: TemplateService::new() }
    }

    /// Renders one combined alert covering `records` for `subscription`.
    pub fn compose(
        &self,
        subscription: &Subscription,
        date: NaiveDate,
        records: &[&ExceedanceRecord],
    ) -> Result<ComposedAlert, MailerError> {
        let mut severity_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in records {
            *severity_counts.entry(r.severity.as_str()).or_insert(0) += 1;
        }
        let summaries: Vec<RecordSummary<'_>> =
            records.iter().map(|r| RecordSummary::from(*r)).collect();

        let context = json!({
            "recipient": subscription.email,
            "frequency": subscription.frequency,
            "date": date.format("%Y-%m-%d").to_string(),
            "count": records.len(),
            "severity_counts": severity_counts,
            "records": summaries,
        });

        let subject = self.template_service.render(&self.templates.subject, &context)?;
        let body = self.template_service.render(&self.templates.body, &context)?;

        Ok(ComposedAlert { subject: subject.trim().to_string(), body })
    }
}
