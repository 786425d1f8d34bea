//! Subscriber list stored as CSV.
//!
//! Recognised columns (matched case-insensitively):
//! - `email`: required.
//! - `permits` or `facilities`: required. Either bare permit numbers or the
//!   facility display form `NAME - PERMIT (COUNTY)`, separated by `|` or,
//!   when no `|` is present, by `,`.
//! - `frequency`: optional, defaults to daily.
//! - `status`: optional; rows whose status is set to anything but `active`
//!   are ignored.

use std::{
    collections::HashMap,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use csv::StringRecord;

use super::{error::PersistenceError, traits::SubscriptionStore};
use crate::models::{Frequency, Subscription};

/// Reads subscriptions from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvSubscriptionStore {
    path: PathBuf,
}

impl CsvSubscriptionStore {
    /// Creates a store reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The subscriptions file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Subscription>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No subscriptions file; nobody to alert.");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(PersistenceError::Read { path: self.path.clone(), source: e.into() });
            }
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader
            .headers()
            .map_err(|source| PersistenceError::Read { path: self.path.clone(), source })?
            .clone();
        let columns = Columns::locate(&headers).ok_or_else(|| {
            PersistenceError::InvalidInput(format!(
                "{} needs an `email` and a `permits` or `facilities` column",
                self.path.display()
            ))
        })?;

        let mut subscriptions: Vec<Subscription> = Vec::new();
        let mut by_email: HashMap<String, usize> = HashMap::new();

        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(row = index + 1, error = %e, "Skipping unreadable subscription row.");
                    continue;
                }
            };

            let email = columns.get(&row, Some(columns.email)).trim().to_ascii_lowercase();
            if !email.contains('@') {
                tracing::warn!(row = index + 1, %email, "Skipping subscription without a valid email.");
                continue;
            }

            let status = columns.get(&row, columns.status).trim();
            if !status.is_empty() && !status.eq_ignore_ascii_case("active") {
                tracing::debug!(row = index + 1, %email, %status, "Skipping inactive subscription.");
                continue;
            }

            let permits = parse_permits(columns.get(&row, Some(columns.permits)));
            if permits.is_empty() {
                tracing::warn!(row = index + 1, %email, "Skipping subscription with no permits.");
                continue;
            }

            match by_email.get(&email) {
                Some(&existing) => subscriptions[existing].permits.extend(permits),
                None => {
                    let frequency = Frequency::parse(columns.get(&row, columns.frequency));
                    by_email.insert(email.clone(), subscriptions.len());
                    subscriptions.push(Subscription::new(email, permits, frequency));
                }
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            subscribers = subscriptions.len(),
            "Loaded subscriptions."
        );
        Ok(subscriptions)
    }
}

#[async_trait]
impl SubscriptionStore for CsvSubscriptionStore {
    async fn load(&self) -> Result<Vec<Subscription>, PersistenceError> {
        self.read()
    }
}

/// Column positions in the subscriptions header row.
struct Columns {
    email: usize,
    permits: usize,
    frequency: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        Some(Self {
            email: find("email")?,
            permits: find("permits").or_else(|| find("facilities"))?,
            frequency: find("frequency"),
            status: find("status"),
        })
    }

    fn get<'r>(&self, row: &'r StringRecord, index: Option<usize>) -> &'r str {
        index.and_then(|i| row.get(i)).unwrap_or_default()
    }
}

/// Splits a stored permit list into permit numbers.
fn parse_permits(raw: &str) -> Vec<String> {
    let separator = if raw.contains('|') { '|' } else { ',' };
    raw.split(separator)
        .map(permit_from_entry)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extracts the permit number from `NAME - PERMIT (COUNTY)`; anything else
/// is taken as a bare permit number.
fn permit_from_entry(entry: &str) -> &str {
    let entry = entry.trim();
    let Some((_, rest)) = entry.rsplit_once(" - ") else {
        return entry;
    };
    let rest = rest.trim();
    match rest.rsplit_once(" (") {
        Some((permit, county)) if county.ends_with(')') => permit.trim(),
        _ => rest,
    }
}
