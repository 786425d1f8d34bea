//! Error types for the file-backed stores.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run: the data directory or a derived file could not
/// be written, or the subscriber list could not be read.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// The data directory could not be created.
    #[error("Failed to prepare data directory {}: {source}", .path.display())]
    DataDir {
        /// The directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// Underlying CSV or I/O error.
        source: csv::Error,
    },

    /// A file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// Underlying CSV or I/O error.
        source: csv::Error,
    },

    /// An invalid configuration or input was provided.
    #[error("An invalid configuration or input was provided: {0}")]
    InvalidInput(String),
}

/// Errors that make a snapshot file unusable.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The file exists but could not be opened or its header row read.
    #[error("Snapshot {} is unreadable: {source}", .path.display())]
    Unreadable {
        /// The snapshot file.
        path: PathBuf,
        /// Underlying CSV or I/O error.
        source: csv::Error,
    },

    /// The header row lacks identity columns.
    #[error("Snapshot {} is missing columns: {}", .path.display(), .columns.join(", "))]
    MissingColumns {
        /// The snapshot file.
        path: PathBuf,
        /// Names of the missing columns.
        columns: Vec<&'static str>,
    },
}
