//! `permitminder dispatch`: alerts for a previously saved day.

use chrono::NaiveDate;
use clap::Parser;

use super::{CommandError, load_job};

/// Arguments for re-sending alerts from a saved new-records file.
#[derive(Parser, Debug)]
pub struct DispatchArgs {
    /// Date of the `new_exceedances_<date>.csv` file to send (YYYY-MM-DD).
    #[arg(short, long)]
    pub date: NaiveDate,
}

/// Sends alerts for an already saved new-records file.
pub async fn execute(config_dir: Option<&str>, args: DispatchArgs) -> Result<(), CommandError> {
    let job = load_job(config_dir)?;
    let summary = job.dispatch_saved(args.date).await?;
    tracing::info!(
        date = %args.date,
        skipped = summary.skipped,
        failed = ?summary.failed,
        "Alerts: {summary}."
    );
    Ok(())
}
