//! Command implementations for the `permitminder` binary.

pub mod dispatch;
pub mod run;

use chrono::{Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::{
    config::AppConfig,
    engine::daily_job::{DailyJob, DailyJobError},
};

pub use dispatch::DispatchArgs;
pub use run::RunArgs;

/// Errors surfaced to the binary.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// The daily job failed.
    #[error("Daily job error: {0}")]
    Job(#[from] DailyJobError),
}

/// Loads configuration and builds the daily job.
fn load_job(config_dir: Option<&str>) -> Result<DailyJob, CommandError> {
    tracing::debug!(config_dir = ?config_dir, "Loading application configuration...");
    let config = AppConfig::new(config_dir)?;
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        subscriptions = %config.subscriptions_path.display(),
        window_days = config.recency_window_days,
        "Configuration loaded."
    );
    Ok(DailyJob::builder().config(config).build()?)
}

/// The run date and the instant recency is measured from.
///
/// Without an explicit date the run is for today. With one, the current
/// local time of day is carried over to that date.
fn resolve_run_time(
    date: Option<NaiveDate>,
    local_now: NaiveDateTime,
) -> (NaiveDate, NaiveDateTime) {
    match date {
        Some(date) => (date, date.and_time(local_now.time())),
        None => (local_now.date(), local_now),
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
