//! Dated snapshot files under the data directory.
//!
//! Layout:
//! - `exceedances_<YYYY_MM_DD>.csv`: the full snapshot for a day.
//! - `new_exceedances_<YYYY_MM_DD>.csv`: rows first seen that day, written
//!   with the snapshot's own header row.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::StringRecord;

use super::error::{PersistenceError, SnapshotError};
use crate::models::{ExceedanceRecord, NewRecordSet, Snapshot, SnapshotEntry};

const DATE_FORMAT: &str = "%Y_%m_%d";

const IDENTITY_COLUMNS: [&str; 4] =
    ["PERMIT_NUMBER", "PARAMETER", "NON_COMPLIANCE_DATE", "SAMPLE_VALUE"];

/// Reads and writes the dated CSV files of one data directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `data_dir`. Nothing is touched on disk until
    /// `ensure_dir` or a write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// The data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Creates the data directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|source| PersistenceError::DataDir { path: self.data_dir.clone(), source })
    }

    /// Path of the full snapshot for `date`.
    pub fn snapshot_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("exceedances_{}.csv", date.format(DATE_FORMAT)))
    }

    /// Path of the new-records file for `date`.
    pub fn new_records_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("new_exceedances_{}.csv", date.format(DATE_FORMAT)))
    }

    /// Loads the snapshot for `date`, or `None` if its file does not exist.
    pub fn load_snapshot(&self, date: NaiveDate) -> Result<Option<Snapshot>, SnapshotError> {
        read_snapshot_file(&self.snapshot_path(date), date)
    }

    /// Loads a previously saved new-records file, or `None` if there is none
    /// for `date`.
    pub fn load_new_records(&self, date: NaiveDate) -> Result<Option<Snapshot>, SnapshotError> {
        read_snapshot_file(&self.new_records_path(date), date)
    }

    /// Writes `records` to the new-records file of its date, replacing any
    /// earlier file for that date. Returns the path written.
    pub fn save_new_records(&self, records: &NewRecordSet) -> Result<PathBuf, PersistenceError> {
        self.ensure_dir()?;
        let path = self.new_records_path(records.date());
        let partial = path.with_extension("csv.partial");

        write_rows(&partial, records.headers(), records.entries())
            .map_err(|source| PersistenceError::Write { path: partial.clone(), source })?;
        fs::rename(&partial, &path)
            .map_err(|e| PersistenceError::Write { path: path.clone(), source: e.into() })?;

        tracing::debug!(path = %path.display(), count = records.len(), "Wrote new-records file.");
        Ok(path)
    }
}

fn write_rows(
    path: &Path,
    headers: &StringRecord,
    entries: &[SnapshotEntry],
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for entry in entries {
        writer.write_record(entry.raw())?;
    }
    writer.flush()?;
    Ok(())
}

fn read_snapshot_file(path: &Path, date: NaiveDate) -> Result<Option<Snapshot>, SnapshotError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Snapshot file not found.");
            return Ok(None);
        }
        Err(e) => return Err(SnapshotError::Unreadable { path: path.to_path_buf(), source: e.into() }),
    };

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|source| SnapshotError::Unreadable { path: path.to_path_buf(), source })?
        .clone();

    if headers.is_empty() {
        return Ok(Some(Snapshot::new(date, headers, Vec::new())));
    }

    let missing: Vec<&'static str> = IDENTITY_COLUMNS
        .into_iter()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(SnapshotError::MissingColumns { path: path.to_path_buf(), columns: missing });
    }

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.records().enumerate() {
        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), row = index + 1, error = %e, "Skipping unreadable snapshot row.");
                skipped += 1;
                continue;
            }
        };
        match raw.deserialize::<ExceedanceRecord>(Some(&headers)) {
            Ok(record) => entries.push(SnapshotEntry::new(record.with_resolved_severity(), raw)),
            Err(e) => {
                tracing::warn!(path = %path.display(), row = index + 1, error = %e, "Skipping undecodable snapshot row.");
                skipped += 1;
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        rows = entries.len(),
        skipped,
        "Loaded snapshot."
    );
    Ok(Some(Snapshot::new(date, headers, entries)))
}
