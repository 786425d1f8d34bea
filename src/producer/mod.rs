//! Runs the external scraper that produces today's snapshot.
//!
//! The scraper is any command that writes a CSV to a known path. On success
//! that file is copied to the dated snapshot path in the data directory.

use std::{
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use thiserror::Error;
use tokio::process::Command;

use crate::config::ProducerConfig;

/// Errors that abort snapshot production, and with it the daily run.
#[derive(Debug, Error)]
pub enum ProducerError {
    /// No program was configured.
    #[error("Producer command is empty")]
    EmptyCommand,

    /// The program could not be started.
    #[error("Failed to start producer {program}: {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("Producer exited with {status}: {stderr}")]
    Failed {
        /// Exit status.
        status: ExitStatus,
        /// Trailing standard error output.
        stderr: String,
    },

    /// The program ran past its time limit and was killed.
    #[error("Producer timed out after {0:?}")]
    Timeout(Duration),

    /// The program succeeded but did not write its output file.
    #[error("Producer output {} was not written", .0.display())]
    MissingOutput(PathBuf),

    /// The output could not be copied into the data directory.
    #[error("Failed to copy producer output to {}: {source}", .path.display())]
    Copy {
        /// The destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

const STDERR_TAIL: usize = 2000;

/// Runs the configured scraper command.
#[derive(Debug, Clone)]
pub struct SnapshotProducer {
    program: String,
    args: Vec<String>,
    output_path: PathBuf,
    timeout: Duration,
}

impl SnapshotProducer {
    /// Creates a producer from its configuration.
    pub fn new(config: ProducerConfig) -> Result<Self, ProducerError> {
        let mut command = config.command.into_iter();
        let program = command
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or(ProducerError::EmptyCommand)?;
        Ok(Self {
            program,
            args: command.collect(),
            output_path: config.output_path,
            timeout: config.timeout_secs,
        })
    }

    /// Runs the command and copies its output to `destination`. Returns the
    /// number of bytes copied.
    ///
    /// Any output file left by a previous run is removed first so a run that
    /// writes nothing is reported as `MissingOutput`.
    pub async fn produce(&self, destination: &Path) -> Result<u64, ProducerError> {
        match tokio::fs::remove_file(&self.output_path).await {
            Ok(()) => {
                tracing::debug!(path = %self.output_path.display(), "Removed stale producer output.")
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.output_path.display(),
                error = %e,
                "Could not remove stale producer output."
            ),
        }

        tracing::info!(program = %self.program, args = ?self.args, timeout = ?self.timeout, "Running snapshot producer.");
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProducerError::Spawn { program: self.program.clone(), source })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|source| ProducerError::Spawn { program: self.program.clone(), source })?,
            Err(_) => return Err(ProducerError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let start = stderr.len().saturating_sub(STDERR_TAIL);
            let tail = stderr.get(start..).unwrap_or(stderr.as_ref()).trim().to_string();
            return Err(ProducerError::Failed { status: output.status, stderr: tail });
        }
        tracing::debug!(stdout = %String::from_utf8_lossy(&output.stdout).trim(), "Producer finished.");

        if !tokio::fs::try_exists(&self.output_path).await.unwrap_or(false) {
            return Err(ProducerError::MissingOutput(self.output_path.clone()));
        }

        let partial = destination.with_extension("csv.partial");
        let bytes = tokio::fs::copy(&self.output_path, &partial)
            .await
            .map_err(|source| ProducerError::Copy { path: partial.clone(), source })?;
        tokio::fs::rename(&partial, destination)
            .await
            .map_err(|source| ProducerError::Copy { path: destination.to_path_buf(), source })?;
        tracing::info!(path = %destination.display(), bytes, "Snapshot produced.");
        Ok(bytes)
    }
}
