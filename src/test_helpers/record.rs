use crate::models::{ExceedanceRecord, Severity};

/// A builder for creating `ExceedanceRecord` instances for testing.
#[derive(Debug, Clone)]
pub struct ExceedanceRecordBuilder {
    record: ExceedanceRecord,
}

impl ExceedanceRecordBuilder {
    /// Creates a builder for a record under `permit`.
    pub fn new(permit: &str) -> Self {
        Self {
            record: ExceedanceRecord {
                permit: permit.to_string(),
                parameter: "pH".to_string(),
                non_compliance_date: "2025-09-01".to_string(),
                sample_value: "9.5".to_string(),
                facility: "Test Facility".to_string(),
                county: "Allegheny".to_string(),
                severity: Severity::Moderate,
                percent_over_limit: Some(5.5),
                permit_value: Some("9.0".to_string()),
                unit: Some("S.U.".to_string()),
            },
        }
    }

    /// Sets the permit identifier.
    pub fn permit(mut self, permit: &str) -> Self {
        self.record.permit = permit.to_string();
        self
    }

    /// Sets the parameter name.
    pub fn parameter(mut self, parameter: &str) -> Self {
        self.record.parameter = parameter.to_string();
        self
    }

    /// Sets the raw non-compliance date.
    pub fn date(mut self, date: &str) -> Self {
        self.record.non_compliance_date = date.to_string();
        self
    }

    /// Sets the raw sampled value.
    pub fn sample_value(mut self, value: &str) -> Self {
        self.record.sample_value = value.to_string();
        self
    }

    /// Sets the facility name.
    pub fn facility(mut self, facility: &str) -> Self {
        self.record.facility = facility.to_string();
        self
    }

    /// Sets the county name.
    pub fn county(mut self, county: &str) -> Self {
        self.record.county = county.to_string();
        self
    }

    /// Sets the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.record.severity = severity;
        self
    }

    /// Sets the percent over limit.
    pub fn percent_over_limit(mut self, pct: Option<f64>) -> Self {
        self.record.percent_over_limit = pct;
        self
    }

    /// Builds the record.
    pub fn build(self) -> ExceedanceRecord {
        self.record
    }
}
