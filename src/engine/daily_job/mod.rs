//! The daily job ties the pipeline together for one run date.
//!
//! ## Stages
//!
//! 1. **Produce**: when a producer is configured, run it and file its output
//!    as today's snapshot. Failure aborts the run. A previous day's existing
//!    snapshot is never replaced.
//! 2. **Load**: read today's and yesterday's snapshots. An unreadable
//!    snapshot for today aborts the run; an unreadable one for yesterday is
//!    treated as absent.
//! 3. **Diff**: hash-set difference plus the recency window.
//! 4. **Save**: write `new_exceedances_<date>.csv` when anything is new.
//! 5. **Dispatch**: send alerts to the subscribers of the affected permits.
//!
//! Stages run strictly in order. Nothing about a failed run is persisted, so
//! the next run starts clean.

mod builder;

use std::sync::Arc;

pub use builder::DailyJobBuilder;
use chrono::{Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

use super::{alert_dispatcher::AlertDispatcher, differ::SnapshotDiffer};
use crate::{
    mailer::error::MailerError,
    models::{DailyRunReport, DispatchSummary, ExceedanceRecord, NewRecordSet, Snapshot},
    persistence::{
        SnapshotStore,
        error::{PersistenceError, SnapshotError},
        traits::SubscriptionStore,
    },
    producer::{ProducerError, SnapshotProducer},
};

/// Errors that abort a daily run.
#[derive(Debug, Error)]
pub enum DailyJobError {
    /// A required configuration was not provided to the `DailyJobBuilder`.
    #[error("Missing configuration for DailyJob")]
    MissingConfig,

    /// The snapshot producer failed.
    #[error("Snapshot producer failed: {0}")]
    Producer(#[from] ProducerError),

    /// Today's snapshot exists but cannot be used.
    #[error("Today's snapshot is unusable: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The data directory or the subscriber list could not be accessed.
    #[error("Storage error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The configured mailer could not be built.
    #[error("Mailer setup failed: {0}")]
    Mailer(#[from] MailerError),
}

/// Which optional stages a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Run the configured producer before diffing.
    pub run_producer: bool,
    /// Send alerts for the new records.
    pub dispatch: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { run_producer: true, dispatch: true }
    }
}

/// One configured instance of the daily pipeline.
pub struct DailyJob {
    store: SnapshotStore,
    differ: SnapshotDiffer,
    producer: Option<SnapshotProducer>,
    subscriptions: Arc<dyn SubscriptionStore>,
    dispatcher: AlertDispatcher,
}

impl DailyJob {
    /// Creates a new `DailyJobBuilder`.
    pub fn builder() -> DailyJobBuilder {
        DailyJobBuilder::new()
    }

    /// The store holding this job's dated files.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs the pipeline for `date`, measuring recency from `now`.
    pub async fn run(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
        options: RunOptions,
    ) -> Result<DailyRunReport, DailyJobError> {
        tracing::info!(%date, %now, ?options, "Starting daily exceedance check.");
        self.store.ensure_dir()?;

        match (&self.producer, options.run_producer) {
            (Some(producer), true) => {
                self.produce(producer, date, Local::now().date_naive()).await?
            }
            (Some(_), false) => tracing::info!("Producer skipped; using the existing snapshot."),
            (None, _) => tracing::debug!("No producer configured; using the existing snapshot."),
        }

        let today = self.store.load_snapshot(date)?;
        let yesterday = self.load_yesterday(date);
        let today_count = today.as_ref().map_or(0, |s| s.len());
        let yesterday_count = yesterday.as_ref().map(|s| s.len());

        let new_records = self.differ.diff(date, today, yesterday.as_ref(), now);

        let new_records_path = if new_records.is_empty() {
            None
        } else {
            Some(self.store.save_new_records(&new_records)?)
        };

        let dispatch = if !options.dispatch {
            tracing::info!("Alert dispatch disabled for this run.");
            None
        } else if new_records.is_empty() {
            tracing::info!("No new exceedances; no alerts to send.");
            None
        } else {
            Some(self.dispatch_set(&new_records).await?)
        };

        let report = DailyRunReport {
            date,
            today_count,
            yesterday_count,
            baseline: new_records.baseline(),
            new_count: new_records.len(),
            severity_breakdown: new_records.severity_breakdown(),
            new_records_path,
            dispatch,
        };
        report.log();
        Ok(report)
    }

    /// Sends alerts for a previously saved new-records file. A date with no
    /// saved file sends nothing.
    pub async fn dispatch_saved(&self, date: NaiveDate) -> Result<DispatchSummary, DailyJobError> {
        let Some(saved) = self.store.load_new_records(date)? else {
            tracing::warn!(
                path = %self.store.new_records_path(date).display(),
                "No saved new exceedances for this date; nothing to send."
            );
            return Ok(DispatchSummary::default());
        };

        let records: Vec<&ExceedanceRecord> = saved.entries().iter().map(|e| &e.record).collect();
        let subscriptions = self.subscriptions.load().await?;
        Ok(self.dispatcher.dispatch(date, &records, &subscriptions).await)
    }

    async fn dispatch_set(&self, set: &NewRecordSet) -> Result<DispatchSummary, DailyJobError> {
        let subscriptions = self.subscriptions.load().await?;
        let records: Vec<&ExceedanceRecord> = set.records().collect();
        Ok(self.dispatcher.dispatch(set.date(), &records, &subscriptions).await)
    }

    /// Runs the producer into the snapshot for `date`. The producer scrapes
    /// current data, so an existing snapshot for a day before `current_date`
    /// is kept as it is.
    async fn produce(
        &self,
        producer: &SnapshotProducer,
        date: NaiveDate,
        current_date: NaiveDate,
    ) -> Result<(), DailyJobError> {
        let destination = self.store.snapshot_path(date);
        if date < current_date && destination.exists() {
            tracing::warn!(
                %date,
                path = %destination.display(),
                "Not running the producer over a previous day's snapshot; using the existing file."
            );
            return Ok(());
        }
        producer.produce(&destination).await?;
        Ok(())
    }

    fn load_yesterday(&self, date: NaiveDate) -> Option<Snapshot> {
        let previous = date.pred_opt()?;
        match self.store.load_snapshot(previous) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    date = %previous,
                    error = %e,
                    "Ignoring unusable snapshot for the previous day."
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::{
        config::{AppConfig, ProducerConfig},
        models::{DiffBaseline, Severity},
        persistence::traits::MockSubscriptionStore,
        test_helpers::{
            ExceedanceRecordBuilder, RecordingMailer, SubscriptionBuilder, at_midnight,
            write_snapshot,
        },
    };

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn yesterday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
    }

    fn now() -> NaiveDateTime {
        at_midnight(2025, 10, 1)
    }

    fn job_with(
        dir: &TempDir,
        subscriptions: MockSubscriptionStore,
        mailer: Arc<RecordingMailer>,
        producer: Option<ProducerConfig>,
    ) -> DailyJob {
        let mut config = AppConfig::builder().data_dir(dir.path().join("data")).build();
        config.producer = producer;
        DailyJob::builder()
            .config(config)
            .mailer(mailer)
            .subscriptions(Arc::new(subscriptions))
            .build()
            .unwrap()
    }

    fn never_loaded() -> MockSubscriptionStore {
        let mut store = MockSubscriptionStore::new();
        store.expect_load().never();
        store
    }

    #[tokio::test]
    async fn producer_failure_aborts_the_run() {
        let dir = tempdir().unwrap();
        let producer = ProducerConfig {
            command: vec!["sh".into(), "-c".into(), "exit 1".into()],
            output_path: dir.path().join("out.csv"),
            timeout_secs: Duration::from_secs(10),
        };
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), Some(producer));

        let result = job.run(today(), now(), RunOptions::default()).await;

        assert!(matches!(result, Err(DailyJobError::Producer(_))));
        assert!(!job.store().new_records_path(today()).exists());
    }

    fn echo_producer(dir: &TempDir, permit: &str) -> ProducerConfig {
        let output = dir.path().join("scraped.csv");
        let script = format!(
            "printf 'PERMIT_NUMBER,PARAMETER,NON_COMPLIANCE_DATE,SAMPLE_VALUE\\n{permit},pH,2025-09-01,9\\n' > '{}'",
            output.display()
        );
        ProducerConfig {
            command: vec!["sh".into(), "-c".into(), script],
            output_path: output,
            timeout_secs: Duration::from_secs(10),
        }
    }

    fn snapshot_permits(job: &DailyJob, date: NaiveDate) -> Vec<String> {
        job.store()
            .load_snapshot(date)
            .unwrap()
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.record.permit.clone())
            .collect()
    }

    #[tokio::test]
    async fn producer_keeps_an_existing_past_snapshot() {
        let dir = tempdir().unwrap();
        let producer = echo_producer(&dir, "CURRENT");
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), Some(producer));
        let past = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        job.store().ensure_dir().unwrap();
        write_snapshot(
            &job.store().snapshot_path(past),
            &[ExceedanceRecordBuilder::new("HISTORICAL").date("2025-08-30").build()],
        );

        let report = job
            .run(past, at_midnight(2025, 9, 1), RunOptions { run_producer: true, dispatch: false })
            .await
            .unwrap();

        assert_eq!(snapshot_permits(&job, past), vec!["HISTORICAL"]);
        assert_eq!(report.today_count, 1);
    }

    #[tokio::test]
    async fn producer_writes_the_current_day_even_if_present() {
        let dir = tempdir().unwrap();
        let producer = echo_producer(&dir, "CURRENT");
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), Some(producer));
        job.store().ensure_dir().unwrap();
        write_snapshot(
            &job.store().snapshot_path(today()),
            &[ExceedanceRecordBuilder::new("EARLIER").build()],
        );

        job.produce(job.producer.as_ref().unwrap(), today(), today()).await.unwrap();

        assert_eq!(snapshot_permits(&job, today()), vec!["CURRENT"]);
    }

    #[tokio::test]
    async fn skipping_the_producer_uses_the_existing_snapshot() {
        let dir = tempdir().unwrap();
        let producer = ProducerConfig {
            command: vec!["sh".into(), "-c".into(), "exit 1".into()],
            output_path: dir.path().join("out.csv"),
            timeout_secs: Duration::from_secs(10),
        };
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), Some(producer));
        job.store().ensure_dir().unwrap();
        write_snapshot(
            &job.store().snapshot_path(today()),
            &[ExceedanceRecordBuilder::new("PA1").date("2025-09-28").build()],
        );

        let options = RunOptions { run_producer: false, dispatch: false };
        let report = job.run(today(), now(), options).await.unwrap();

        assert_eq!(report.new_count, 1);
        assert!(report.dispatch.is_none());
    }

    #[tokio::test]
    async fn unusable_today_snapshot_aborts() {
        let dir = tempdir().unwrap();
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), None);
        job.store().ensure_dir().unwrap();
        fs::write(job.store().snapshot_path(today()), "foo,bar\n1,2\n").unwrap();

        let result = job.run(today(), now(), RunOptions::default()).await;
        assert!(matches!(result, Err(DailyJobError::Snapshot(_))));
    }

    #[tokio::test]
    async fn unusable_yesterday_snapshot_is_treated_as_absent() {
        let dir = tempdir().unwrap();
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), None);
        job.store().ensure_dir().unwrap();
        fs::write(job.store().snapshot_path(yesterday()), "garbage\n").unwrap();
        write_snapshot(
            &job.store().snapshot_path(today()),
            &[ExceedanceRecordBuilder::new("PA1").date("2025-09-28").build()],
        );

        let report = job
            .run(today(), now(), RunOptions { run_producer: true, dispatch: false })
            .await
            .unwrap();

        assert_eq!(report.baseline, DiffBaseline::RecencyOnly);
        assert_eq!(report.yesterday_count, None);
        assert_eq!(report.new_count, 1);
    }

    #[tokio::test]
    async fn missing_today_is_not_an_error() {
        let dir = tempdir().unwrap();
        let job = job_with(&dir, never_loaded(), Arc::new(RecordingMailer::new()), None);

        let report = job.run(today(), now(), RunOptions::default()).await.unwrap();

        assert_eq!(report.baseline, DiffBaseline::NothingToCheck);
        assert_eq!(report.new_count, 0);
        assert!(report.new_records_path.is_none());
        assert!(dir.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn new_records_are_saved_and_dispatched() {
        let dir = tempdir().unwrap();
        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions.expect_load().times(1).returning(|| {
            Ok(vec![
                SubscriptionBuilder::new("a@example.com").permit("PA1").build(),
                SubscriptionBuilder::new("b@example.com").permit("PA9").build(),
            ])
        });
        let mailer = Arc::new(RecordingMailer::new());
        let job = job_with(&dir, subscriptions, mailer.clone(), None);
        job.store().ensure_dir().unwrap();
        let old = ExceedanceRecordBuilder::new("PA1").date("2025-09-20").build();
        let new = ExceedanceRecordBuilder::new("PA1")
            .date("2025-09-29")
            .parameter("Ammonia")
            .severity(Severity::Critical)
            .build();
        write_snapshot(&job.store().snapshot_path(yesterday()), &[old.clone()]);
        write_snapshot(&job.store().snapshot_path(today()), &[old, new]);

        let report = job.run(today(), now(), RunOptions::default()).await.unwrap();

        assert_eq!(report.today_count, 2);
        assert_eq!(report.yesterday_count, Some(1));
        assert_eq!(report.baseline, DiffBaseline::PriorSnapshot(1));
        assert_eq!(report.new_count, 1);
        assert_eq!(report.severity_breakdown.get(&Severity::Critical), Some(&1));
        assert_eq!(report.new_records_path, Some(job.store().new_records_path(today())));
        let summary = report.dispatch.unwrap();
        assert_eq!(summary.to_string(), "1 of 1 sent");
        assert_eq!(summary.skipped, 1);
        assert_eq!(mailer.sent()[0].recipient, "a@example.com");
        assert!(mailer.sent()[0].body.contains("Ammonia"));
    }

    #[tokio::test]
    async fn subscription_store_errors_abort_dispatch() {
        let dir = tempdir().unwrap();
        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions
            .expect_load()
            .returning(|| Err(PersistenceError::InvalidInput("no email column".into())));
        let job = job_with(&dir, subscriptions, Arc::new(RecordingMailer::new()), None);
        job.store().ensure_dir().unwrap();
        write_snapshot(
            &job.store().snapshot_path(today()),
            &[ExceedanceRecordBuilder::new("PA1").date("2025-09-28").build()],
        );

        let result = job.run(today(), now(), RunOptions::default()).await;

        assert!(matches!(result, Err(DailyJobError::Persistence(_))));
        assert!(job.store().new_records_path(today()).exists());
    }

    #[tokio::test]
    async fn dispatch_saved_without_a_file_sends_nothing() {
        let dir = tempdir().unwrap();
        let mailer = Arc::new(RecordingMailer::new());
        let job = job_with(&dir, never_loaded(), mailer.clone(), None);

        let summary = job.dispatch_saved(today()).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn dispatch_saved_reads_the_new_records_file() {
        let dir = tempdir().unwrap();
        let mut subscriptions = MockSubscriptionStore::new();
        subscriptions
            .expect_load()
            .returning(|| Ok(vec![SubscriptionBuilder::new("a@example.com").permit("PA7").build()]));
        let mailer = Arc::new(RecordingMailer::new());
        let job = job_with(&dir, subscriptions, mailer.clone(), None);
        job.store().ensure_dir().unwrap();
        write_snapshot(
            &job.store().new_records_path(today()),
            &[ExceedanceRecordBuilder::new("PA7").build()],
        );

        let summary = job.dispatch_saved(today()).await.unwrap();

        assert_eq!(summary.sent, 1);
        assert_eq!(mailer.sent().len(), 1);
    }
}
