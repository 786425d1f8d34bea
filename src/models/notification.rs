//! Data models for alert messages.

use serde::{Deserialize, Serialize};

fn default_subject() -> String {
    "PermitMinder Alert: {{ count }} new exceedance{% if count != 1 %}s{% endif %} for your \
     monitored facilities"
        .to_string()
}

fn default_body() -> String {
    "\
New permit exceedances were detected on {{ date }} for facilities you monitor.

{% for r in records -%}
- {{ r.facility }} ({{ r.permit }}, {{ r.county }} County)
  {{ r.parameter }} on {{ r.date }}: sampled {{ r.sample_value }}\
{% if r.permit_value %} against a limit of {{ r.permit_value }}{% endif %}\
{% if r.unit %} {{ r.unit }}{% endif %}
  Severity: {{ r.severity }}, {{ r.percent_over_limit | percent }} over limit
{% endfor %}
You are receiving this because {{ recipient }} subscribed to {{ frequency }} PermitMinder alerts.
"
    .to_string()
}

/// Subject and body templates for alert emails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Template for the email subject.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Template for the email body.
    #[serde(default = "default_body")]
    pub body: String,
}

impl Default for NotificationMessage {
    fn default() -> Self {
        Self { subject: default_subject(), body: default_body() }
    }
}
