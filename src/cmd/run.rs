//! `permitminder run`: one pass of the daily pipeline.

use chrono::NaiveDate;
use clap::Parser;

use super::{CommandError, load_job, local_now, resolve_run_time};
use crate::engine::daily_job::RunOptions;

/// Arguments for a daily run.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Run date (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Find and save new exceedances without sending alerts.
    #[arg(long)]
    pub no_dispatch: bool,

    /// Use the snapshot already in the data directory instead of running the
    /// configured producer.
    #[arg(long)]
    pub skip_producer: bool,
}

/// Runs the full pipeline once.
pub async fn execute(config_dir: Option<&str>, args: RunArgs) -> Result<(), CommandError> {
    let job = load_job(config_dir)?;
    let local = local_now();
    let (date, now) = resolve_run_time(args.date, local);
    let options = run_options(&args, date, local.date());

    job.run(date, now, options).await?;
    Ok(())
}

/// The producer scrapes current data, so it only runs for today's date.
fn run_options(args: &RunArgs, date: NaiveDate, today: NaiveDate) -> RunOptions {
    let run_producer = if args.skip_producer {
        false
    } else if date != today {
        tracing::info!(%date, %today, "Run date is not today; using the existing snapshot.");
        false
    } else {
        true
    };
    RunOptions { run_producer, dispatch: !args.no_dispatch }
}
