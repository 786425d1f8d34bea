//! Trailing time window applied to new records.

use chrono::{NaiveDateTime, TimeDelta};

use crate::models::{ExceedanceRecord, SnapshotEntry};

/// Keeps records whose non-compliance date falls within the last
/// `window_days` days of a given "now".
///
/// A record is kept when its parsed date is at or after `now - window`.
/// Records with an unparseable date, or without a permit or parameter, are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyFilter {
    window: TimeDelta,
}

impl RecencyFilter {
    /// Creates a filter with a window of `window_days` days.
    pub fn new(window_days: u32) -> Self {
        Self { window: TimeDelta::days(i64::from(window_days)) }
    }

    /// The window length.
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// The oldest date-time still considered recent at `now`.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now.checked_sub_signed(self.window).unwrap_or(NaiveDateTime::MIN)
    }

    /// Whether `record` is inside the window at `now`.
    pub fn is_recent(&self, record: &ExceedanceRecord, now: NaiveDateTime) -> bool {
        if record.permit.trim().is_empty() || record.parameter.trim().is_empty() {
            return false;
        }
        record.non_compliance_at().is_some_and(|at| at >= self.cutoff(now))
    }

    /// Keeps the entries inside the window, preserving order.
    pub fn apply(&self, entries: Vec<SnapshotEntry>, now: NaiveDateTime) -> Vec<SnapshotEntry> {
        let before = entries.len();
        let kept: Vec<SnapshotEntry> =
            entries.into_iter().filter(|e| self.is_recent(&e.record, now)).collect();
        tracing::debug!(
            cutoff = %self.cutoff(now),
            before,
            after = kept.len(),
            "Applied recency window."
        );
        kept
    }
}

impl Default for RecencyFilter {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use csv::StringRecord;

    use super::*;
    use crate::test_helpers::{ExceedanceRecordBuilder, at_midnight};

    fn entry(permit: &str, date: &str) -> SnapshotEntry {
        SnapshotEntry::new(ExceedanceRecordBuilder::new(permit).date(date).build(), StringRecord::new())
    }

    #[test]
    fn boundary_is_inclusive() {
        let filter = RecencyFilter::new(30);
        let now = at_midnight(2025, 10, 1) + TimeDelta::hours(12);

        let at_cutoff = ExceedanceRecordBuilder::new("PA1").date("2025-09-01 12:00:00").build();
        let second_older = ExceedanceRecordBuilder::new("PA1").date("2025-09-01 11:59:59").build();

        assert!(filter.is_recent(&at_cutoff, now));
        assert!(!filter.is_recent(&second_older, now));
    }

    #[test]
    fn unparseable_and_incomplete_records_are_excluded() {
        let filter = RecencyFilter::new(30);
        let now = at_midnight(2025, 10, 1);

        assert!(!filter.is_recent(&ExceedanceRecordBuilder::new("PA1").date("soon").build(), now));
        assert!(!filter.is_recent(&ExceedanceRecordBuilder::new("PA1").date("").build(), now));
        assert!(!filter.is_recent(&ExceedanceRecordBuilder::new("").date("2025-09-30").build(), now));
        assert!(filter.is_recent(&ExceedanceRecordBuilder::new("PA1").date("09/30/2025").build(), now));
    }

    #[test]
    fn apply_is_idempotent_and_keeps_order() {
        let filter = RecencyFilter::new(30);
        let now = at_midnight(2025, 10, 1);
        let entries = vec![
            entry("PA1", "2025-09-30"),
            entry("PA2", "2025-06-01"),
            entry("PA3", "2025-09-15"),
            entry("PA4", "bad"),
        ];

        let once = filter.apply(entries, now);
        let permits: Vec<_> = once.iter().map(|e| e.record.permit.clone()).collect();
        assert_eq!(permits, vec!["PA1", "PA3"]);

        let twice = filter.apply(once.clone(), now);
        let again: Vec<_> = twice.iter().map(|e| e.record.permit.clone()).collect();
        assert_eq!(again, permits);
    }

    #[test]
    fn zero_day_window_keeps_only_now_or_later() {
        let filter = RecencyFilter::new(0);
        let now = at_midnight(2025, 10, 1);
        assert_eq!(filter.cutoff(now), now);
        assert!(filter.is_recent(&ExceedanceRecordBuilder::new("PA1").date("2025-10-01").build(), now));
        assert!(!filter.is_recent(&ExceedanceRecordBuilder::new("PA1").date("2025-09-30").build(), now));
    }
}
