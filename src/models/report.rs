//! Summaries reported to the operator at the end of a run.

use std::{collections::BTreeMap, fmt, path::PathBuf};

use chrono::NaiveDate;

use super::{exceedance::Severity, snapshot::DiffBaseline};

/// Outcome of one dispatch pass over the subscriber list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Subscribers with at least one matching record, i.e. sends attempted.
    pub attempted: usize,
    /// Sends that succeeded.
    pub sent: usize,
    /// Recipients whose send failed or timed out.
    pub failed: Vec<String>,
    /// Subscribers with no matching records.
    pub skipped: usize,
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} sent", self.sent, self.attempted)
    }
}

/// Everything a daily run did, for the operator log.
#[derive(Debug, Clone)]
pub struct DailyRunReport {
    /// The run date.
    pub date: NaiveDate,
    /// Rows in today's snapshot.
    pub today_count: usize,
    /// Rows in yesterday's snapshot, if it was usable.
    pub yesterday_count: Option<usize>,
    /// What today's snapshot was compared against.
    pub baseline: DiffBaseline,
    /// Number of new records found.
    pub new_count: usize,
    /// New records per severity.
    pub severity_breakdown: BTreeMap<Severity, usize>,
    /// Where the new records were written, if any were found.
    pub new_records_path: Option<PathBuf>,
    /// Alert delivery outcome, if dispatch ran.
    pub dispatch: Option<DispatchSummary>,
}

impl DailyRunReport {
    /// Logs the report at info level.
    pub fn log(&self) {
        tracing::info!(
            date = %self.date,
            today = self.today_count,
            yesterday = ?self.yesterday_count,
            baseline = %self.baseline,
            new = self.new_count,
            "Daily exceedance check finished."
        );
        for (severity, count) in &self.severity_breakdown {
            tracing::info!(%severity, count, "New exceedances by severity.");
        }
        if let Some(path) = &self.new_records_path {
            tracing::info!(path = %path.display(), "New exceedances saved.");
        }
        match &self.dispatch {
            Some(summary) => tracing::info!(
                skipped = summary.skipped,
                failed = ?summary.failed,
                "Alerts: {summary}."
            ),
            None => tracing::info!("Alert dispatch did not run."),
        }
    }
}
