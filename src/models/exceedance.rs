//! This module defines the `ExceedanceRecord` model and its identity key.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Separator placed between identity fields before hashing. It does not
/// occur in permit numbers, parameter names, dates or sampled values.
const KEY_SEPARATOR: &str = "|";

/// Date-time layouts accepted for the non-compliance date.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts accepted for the non-compliance date.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Severity classification of an exceedance.
///
/// Variants are declared from most to least severe so that ordered maps list
/// critical events first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum Severity {
    /// Sampled value at or above 500% of the permit limit.
    Critical,
    /// Sampled value at or above 200% of the permit limit.
    High,
    /// Any other exceedance of the permit limit.
    Moderate,
    /// The sample did not exceed its limit.
    Compliant,
    /// The classification is missing or not recognised.
    #[default]
    Unknown,
}

impl Severity {
    /// Classifies an exceedance from its percent over limit using the static
    /// thresholds applied when the snapshot is prepared.
    pub fn from_percent_over_limit(percent_over_limit: f64) -> Self {
        if percent_over_limit <= 0.0 {
            return Severity::Compliant;
        }
        let percent_of_limit = percent_over_limit + 100.0;
        if percent_of_limit >= 500.0 {
            Severity::Critical
        } else if percent_of_limit >= 200.0 {
            Severity::High
        } else {
            Severity::Moderate
        }
    }

    /// Returns the label used in snapshot files and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Moderate => "Moderate",
            Severity::Compliant => "Compliant",
            Severity::Unknown => "Unknown",
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "moderate" => Severity::Moderate,
            "compliant" => Severity::Compliant,
            _ => Severity::Unknown,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Severity::from).unwrap_or_default())
    }
}

/// Reads an optional non-negative number, treating blanks, `N/A`, `nan` and
/// other unparseable values as missing.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().trim_end_matches('%').parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0))
}

/// The natural key of an exceedance event.
///
/// Two records with equal keys describe the same event, whatever their
/// descriptive fields say.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExceedanceKey {
    /// Permit identifier.
    pub permit: String,
    /// Parameter name.
    pub parameter: String,
    /// Non-compliance date, exactly as it appears in the snapshot.
    pub non_compliance_date: String,
    /// Sampled value, exactly as it appears in the snapshot.
    pub sample_value: String,
}

impl ExceedanceKey {
    /// Derives the identity hash: the hex MD5 digest of the key fields joined
    /// by `|`.
    ///
    /// Values are hashed verbatim, so `"120"` and `"120.0"` are different
    /// events.
    pub fn identity_hash(&self) -> IdentityHash {
        IdentityHash(format!("{:x}", md5::compute(self.to_string())))
    }
}

impl fmt::Display for ExceedanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            self.permit,
            self.parameter,
            self.non_compliance_date,
            self.sample_value,
            sep = KEY_SEPARATOR
        )
    }
}

/// Opaque identity digest of an `ExceedanceKey`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IdentityHash(String);

impl IdentityHash {
    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One reported permit-parameter non-compliance event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ExceedanceRecord {
    /// Permit identifier.
    #[serde(rename = "PERMIT_NUMBER", default)]
    pub permit: String,

    /// Name of the sampled parameter.
    #[serde(rename = "PARAMETER", default)]
    pub parameter: String,

    /// Non-compliance date as written by the snapshot producer.
    #[serde(rename = "NON_COMPLIANCE_DATE", default)]
    pub non_compliance_date: String,

    /// Sampled value, possibly qualified (e.g. `<0.05`).
    #[serde(rename = "SAMPLE_VALUE", default)]
    pub sample_value: String,

    /// Facility name.
    #[serde(rename = "PF_NAME", default)]
    pub facility: String,

    /// County name.
    #[serde(rename = "COUNTY_NAME", default)]
    pub county: String,

    /// Severity classification.
    #[serde(rename = "Severity", default)]
    pub severity: Severity,

    /// Percent by which the sample exceeded its limit.
    #[serde(rename = "Percent_Over_Limit", default, deserialize_with = "deserialize_lenient_number")]
    pub percent_over_limit: Option<f64>,

    /// Permit limit the sample was compared against.
    #[serde(rename = "PERMIT_VALUE", default)]
    pub permit_value: Option<String>,

    /// Unit of measure of the sample and limit.
    #[serde(rename = "UNIT_OF_MEASURE", default)]
    pub unit: Option<String>,
}

impl ExceedanceRecord {
    /// Returns the natural key of this record.
    pub fn key(&self) -> ExceedanceKey {
        ExceedanceKey {
            permit: self.permit.clone(),
            parameter: self.parameter.clone(),
            non_compliance_date: self.non_compliance_date.clone(),
            sample_value: self.sample_value.clone(),
        }
    }

    /// Shorthand for `self.key().identity_hash()`.
    pub fn identity_hash(&self) -> IdentityHash {
        self.key().identity_hash()
    }

    /// Parses the non-compliance date. Date-only values resolve to midnight.
    /// Returns `None` when the value matches none of the accepted layouts.
    pub fn non_compliance_at(&self) -> Option<NaiveDateTime> {
        parse_compliance_date(&self.non_compliance_date)
    }

    /// Fills in an unknown severity from the percent over limit, when one is
    /// available.
    pub fn with_resolved_severity(mut self) -> Self {
        if self.severity == Severity::Unknown {
            if let Some(pct) = self.percent_over_limit {
                self.severity = Severity::from_percent_over_limit(pct);
            }
        }
        self
    }
}

/// Best-effort parse of a non-compliance date.
pub fn parse_compliance_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
