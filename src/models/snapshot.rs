//! Dated snapshots of exceedance records and the sets derived from them.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use chrono::NaiveDate;
use csv::StringRecord;

use super::exceedance::{ExceedanceRecord, IdentityHash, Severity};

/// A single snapshot row: the decoded record, its identity hash and the raw
/// CSV fields it was read from.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    /// The decoded record.
    pub record: ExceedanceRecord,
    /// Identity hash of `record`.
    pub hash: IdentityHash,
    raw: StringRecord,
}

impl SnapshotEntry {
    /// Creates an entry from a decoded record and the raw row it came from.
    pub fn new(record: ExceedanceRecord, raw: StringRecord) -> Self {
        let hash = record.identity_hash();
        Self { record, hash, raw }
    }

    /// The raw CSV fields of this row.
    pub fn raw(&self) -> &StringRecord {
        &self.raw
    }
}

/// All known exceedances as of a given day.
#[derive(Debug, Clone)]
pub struct Snapshot {
    date: NaiveDate,
    headers: StringRecord,
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Creates a snapshot for `date`.
    pub fn new(date: NaiveDate, headers: StringRecord, entries: Vec<SnapshotEntry>) -> Self {
        Self { date, headers, entries }
    }

    /// The day this snapshot describes.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The header row of the file this snapshot was read from.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// The snapshot rows, in file order.
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Consumes the snapshot, returning its rows.
    pub fn into_parts(self) -> (StringRecord, Vec<SnapshotEntry>) {
        (self.headers, self.entries)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The set of identity hashes present in this snapshot.
    pub fn hashes(&self) -> HashSet<&IdentityHash> {
        self.entries.iter().map(|e| &e.hash).collect()
    }
}

/// What today's snapshot was compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffBaseline {
    /// There was nothing to compare: today's snapshot was missing or empty.
    NothingToCheck,
    /// No usable prior snapshot; only the recency window applied.
    RecencyOnly,
    /// The prior day's snapshot, with this many rows.
    PriorSnapshot(usize),
}

impl fmt::Display for DiffBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffBaseline::NothingToCheck => f.write_str("nothing to check"),
            DiffBaseline::RecencyOnly => f.write_str("recency window only"),
            DiffBaseline::PriorSnapshot(n) => write!(f, "prior snapshot ({n} records)"),
        }
    }
}

/// Exceedances observed for the first time on a given day.
#[derive(Debug, Clone)]
pub struct NewRecordSet {
    date: NaiveDate,
    headers: StringRecord,
    entries: Vec<SnapshotEntry>,
    baseline: DiffBaseline,
}

impl NewRecordSet {
    /// Creates a new-record set.
    pub fn new(
        date: NaiveDate,
        headers: StringRecord,
        entries: Vec<SnapshotEntry>,
        baseline: DiffBaseline,
    ) -> Self {
        Self { date, headers, entries, baseline }
    }

    /// An empty set for `date`.
    pub fn empty(date: NaiveDate, baseline: DiffBaseline) -> Self {
        Self::new(date, StringRecord::new(), Vec::new(), baseline)
    }

    /// The run date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The header row shared with the source snapshot.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// The new rows.
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Iterates the decoded records.
    pub fn records(&self) -> impl Iterator<Item = &ExceedanceRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// What the snapshot was compared against.
    pub fn baseline(&self) -> DiffBaseline {
        self.baseline
    }

    /// Number of new records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no new records were found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of new records per severity, most severe first.
    pub fn severity_breakdown(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for record in self.records() {
            *counts.entry(record.severity).or_insert(0) += 1;
        }
        counts
    }
}
