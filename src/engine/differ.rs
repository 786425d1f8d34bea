//! Finds the exceedances in today's snapshot that were not in yesterday's.

use chrono::{NaiveDate, NaiveDateTime};

use super::recency::RecencyFilter;
use crate::models::{DiffBaseline, NewRecordSet, Snapshot};

/// Set difference of two snapshots by identity hash, followed by the
/// recency window.
#[derive(Debug, Clone, Default)]
pub struct SnapshotDiffer {
    recency: RecencyFilter,
}

impl SnapshotDiffer {
    /// Creates a differ applying `recency` to its results.
    pub fn new(recency: RecencyFilter) -> Self {
        Self { recency }
    }

    /// The recency window applied after the set difference.
    pub fn recency(&self) -> &RecencyFilter {
        &self.recency
    }

    /// Computes the new records of `date`.
    ///
    /// - No or empty `today`: empty result with `DiffBaseline::NothingToCheck`.
    /// - No or empty `yesterday`: every row of `today` inside the window.
    /// - Otherwise: rows of `today` whose hash is absent from `yesterday`,
    ///   inside the window. Duplicate rows in `today` are all kept.
    pub fn diff(
        &self,
        date: NaiveDate,
        today: Option<Snapshot>,
        yesterday: Option<&Snapshot>,
        now: NaiveDateTime,
    ) -> NewRecordSet {
        let Some(today) = today.filter(|s| !s.is_empty()) else {
            tracing::info!(%date, "No snapshot for today; nothing to check.");
            return NewRecordSet::empty(date, DiffBaseline::NothingToCheck);
        };

        let (baseline, headers, candidates) = match yesterday.filter(|s| !s.is_empty()) {
            Some(prior) => {
                let known = prior.hashes();
                let today_count = today.len();
                let (headers, entries) = today.into_parts();
                let unseen: Vec<_> =
                    entries.into_iter().filter(|e| !known.contains(&e.hash)).collect();
                tracing::debug!(
                    today = today_count,
                    yesterday = prior.len(),
                    unseen = unseen.len(),
                    "Compared snapshots by identity hash."
                );
                (DiffBaseline::PriorSnapshot(prior.len()), headers, unseen)
            }
            None => {
                tracing::info!(
                    %date,
                    "No usable snapshot for the previous day; using recency window only."
                );
                let (headers, entries) = today.into_parts();
                (DiffBaseline::RecencyOnly, headers, entries)
            }
        };

        let kept = self.recency.apply(candidates, now);
        self.finish(NewRecordSet::new(date, headers, kept, baseline))
    }

    fn finish(&self, set: NewRecordSet) -> NewRecordSet {
        tracing::info!(
            date = %set.date(),
            baseline = %set.baseline(),
            new = set.len(),
            window_days = self.recency.window().num_days(),
            "Found new exceedances."
        );
        set
    }
}

#[cfg(test)]
mod tests {
    use csv::StringRecord;

    use super::*;
    use crate::{
        models::{ExceedanceRecord, SnapshotEntry},
        test_helpers::{ExceedanceRecordBuilder, at_midnight},
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn now() -> NaiveDateTime {
        at_midnight(2025, 10, 1)
    }

    fn snapshot(records: &[ExceedanceRecord]) -> Snapshot {
        let entries =
            records.iter().cloned().map(|r| SnapshotEntry::new(r, StringRecord::new())).collect();
        Snapshot::new(date(), StringRecord::from(vec!["PERMIT_NUMBER"]), entries)
    }

    fn record(permit: &str, date: &str) -> ExceedanceRecord {
        ExceedanceRecordBuilder::new(permit).date(date).build()
    }

    fn permits(set: &NewRecordSet) -> Vec<&str> {
        set.records().map(|r| r.permit.as_str()).collect()
    }

    #[test]
    fn missing_today_is_nothing_to_check() {
        let differ = SnapshotDiffer::default();
        let yesterday = snapshot(&[record("PA1", "2025-09-30")]);

        let set = differ.diff(date(), None, Some(&yesterday), now());
        assert!(set.is_empty());
        assert_eq!(set.baseline(), DiffBaseline::NothingToCheck);

        let set = differ.diff(date(), Some(snapshot(&[])), Some(&yesterday), now());
        assert_eq!(set.baseline(), DiffBaseline::NothingToCheck);
    }

    #[test]
    fn self_diff_is_empty() {
        let differ = SnapshotDiffer::default();
        let records = [record("PA1", "2025-09-30"), record("PA2", "2025-09-29")];
        let today = snapshot(&records);
        let yesterday = snapshot(&records);

        let set = differ.diff(date(), Some(today), Some(&yesterday), now());

        assert!(set.is_empty());
        assert_eq!(set.baseline(), DiffBaseline::PriorSnapshot(2));
    }

    #[test]
    fn hash_new_records_are_still_subject_to_the_window() {
        let differ = SnapshotDiffer::new(RecencyFilter::new(30));
        let h1 = record("PA1", "2025-09-20");
        let h2 = record("PA2", "2025-09-21");
        let recent = record("PA3", "2025-09-26");
        let old = record("PA4", "2025-08-17");
        let yesterday = snapshot(&[h1.clone(), h2.clone()]);

        let set = differ.diff(date(), Some(snapshot(&[h1, h2, recent, old])), Some(&yesterday), now());

        assert_eq!(permits(&set), vec!["PA3"]);
    }

    #[test]
    fn descriptive_changes_are_not_new() {
        let differ = SnapshotDiffer::default();
        let before = record("PA1", "2025-09-30");
        let mut after = before.clone();
        after.facility = "Renamed Plant".to_string();
        after.percent_over_limit = Some(900.0);

        let set = differ.diff(date(), Some(snapshot(&[after])), Some(&snapshot(&[before])), now());
        assert!(set.is_empty());
    }

    #[test]
    fn missing_yesterday_falls_back_to_the_window() {
        let differ = SnapshotDiffer::default();
        let today = snapshot(&[
            record("PA1", "2025-09-30"),
            record("PA2", "2024-01-01"),
            record("PA3", "not a date"),
        ]);

        let set = differ.diff(date(), Some(today.clone()), None, now());
        assert_eq!(permits(&set), vec!["PA1"]);
        assert_eq!(set.baseline(), DiffBaseline::RecencyOnly);

        let set = differ.diff(date(), Some(today), Some(&snapshot(&[])), now());
        assert_eq!(set.baseline(), DiffBaseline::RecencyOnly);
    }

    #[test]
    fn duplicate_rows_are_all_reported() {
        let differ = SnapshotDiffer::default();
        let dup = record("PA1", "2025-09-30");
        let set = differ.diff(date(), Some(snapshot(&[dup.clone(), dup])), None, now());
        assert_eq!(set.len(), 2);
    }
}
