//! Subscriber models.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;

/// How often a subscriber asked to hear about new exceedances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// As soon as an exceedance is detected.
    Immediate,
    /// Once a day.
    #[default]
    Daily,
    /// Once a week.
    Weekly,
    /// Once a month.
    Monthly,
}

impl Frequency {
    /// Parses a frequency from its stored form.
    ///
    /// Matching is case-insensitive on the first word, so both `weekly` and
    /// `Weekly Summary` are accepted. Anything unrecognised is `Daily`.
    pub fn parse(raw: &str) -> Self {
        let first_word = raw.split_whitespace().next().unwrap_or_default().to_ascii_lowercase();
        match first_word.as_str() {
            "immediate" => Frequency::Immediate,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Daily,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Immediate => "immediate",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

/// An email address and the permits it wants alerts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    /// Recipient address.
    pub email: String,
    /// Monitored permit identifiers.
    pub permits: BTreeSet<String>,
    /// Delivery preference.
    pub frequency: Frequency,
}

impl Subscription {
    /// Creates a subscription.
    pub fn new<I, S>(email: impl Into<String>, permits: I, frequency: Frequency) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            email: email.into(),
            permits: permits.into_iter().map(Into::into).collect(),
            frequency,
        }
    }

    /// Whether this subscriber monitors `permit`.
    pub fn monitors(&self, permit: &str) -> bool {
        self.permits.contains(permit)
    }
}
