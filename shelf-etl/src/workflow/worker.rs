//! Job worker

use super::loader::{load_book, LoadReceipt};
use super::statistics::RunSummary;
use crate::db::jobs;
use crate::error::{PipelineError, Result};
use crate::job::{Job, JobEvent, JobStateMachine, JobStatus, JobUpdate};
use crate::reconcile;
use crate::source::{BookSource, SourceDocument};
use chrono::NaiveDate;
use shelf_common::time::today;
use shelf_common::PipelineConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed(LoadReceipt),
    /// Back to PENDING for a later run
    Retrying { retry_count: u32, error: String },
    /// Retry budget exhausted
    Failed { error: String },
}

pub struct Worker {
    pool: SqlitePool,
    google_books: Arc<dyn BookSource>,
    open_library: Arc<dyn BookSource>,
    state_machine: JobStateMachine,
    batch_size: usize,
}

impl Worker {
    pub fn new(
        pool: SqlitePool,
        google_books: Arc<dyn BookSource>,
        open_library: Arc<dyn BookSource>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            pool,
            google_books,
            open_library,
            state_machine: JobStateMachine::new(config.retry_max_attempts),
            batch_size: config.batch_size,
        }
    }

    /// Process one batch with today's (UTC) snapshot date
    pub async fn run_batch(&self) -> Result<RunSummary> {
        self.run_batch_on(today()).await
    }

    /// Process one batch, attributing metrics to `snapshot_date`
    ///
    /// Only a failure to read the queue aborts the run. Per-job errors are
    /// counted in the summary and the batch moves on.
    pub async fn run_batch_on(&self, snapshot_date: NaiveDate) -> Result<RunSummary> {
        let batch = jobs::fetch_pending(&self.pool, self.batch_size).await?;
        let mut summary = RunSummary::new(batch.len());

        info!(
            jobs = batch.len(),
            batch_size = self.batch_size,
            max_retries = self.state_machine.max_retries(),
            %snapshot_date,
            "Starting batch"
        );

        for job in &batch {
            match self.process_job(job, snapshot_date, &mut summary).await {
                Ok(JobOutcome::Completed(receipt)) => {
                    info!(job_id = job.job_id, book_id = receipt.book_id, "Job completed");
                    summary.completed += 1;
                }
                Ok(JobOutcome::Retrying { retry_count, error }) => {
                    warn!(job_id = job.job_id, retry_count, error = %error, "Job returned to queue");
                    summary.marked_for_retry += 1;
                    summary.errors.push(error);
                }
                Ok(JobOutcome::Failed { error }) => {
                    error!(job_id = job.job_id, error = %error, "Job permanently failed");
                    summary.permanently_failed += 1;
                    summary.errors.push(error);
                }
                Err(e @ PipelineError::JobUpdate { .. }) => {
                    // Not retried: the queue row is gone or changed underneath us
                    error!(job_id = job.job_id, error = %e, "Job status write affected no row");
                    summary.job_update_failures += 1;
                    summary.errors.push(e.to_string());
                }
                Err(e) => {
                    error!(job_id = job.job_id, kind = e.kind(), error = %e, "Job aborted");
                    summary.aborted += 1;
                    summary.errors.push(e.to_string());
                }
            }
        }

        summary.log();
        Ok(summary)
    }

    /// Take one PENDING job through the pipeline
    ///
    /// Errors returned here are queue-level (status write or transition)
    /// failures; pipeline failures are absorbed into the retry decision.
    pub async fn process_job(
        &self,
        job: &Job,
        snapshot_date: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<JobOutcome> {
        let identity = job.identity();
        debug!(job_id = job.job_id, title = %job.title, author = %job.author, "Processing job");

        let google_books = self.google_books.fetch(&identity).await;
        summary.google_books.record(google_books.is_some());

        let open_library = self.open_library.fetch(&identity).await;
        summary.open_library.record(open_library.is_some());

        if google_books.is_none() && open_library.is_none() {
            let failure = PipelineError::ExtractionFailure(format!(
                "no data from {} or {}",
                self.google_books.origin(),
                self.open_library.origin()
            ));
            return self.fail(job.job_id, job.status, job.retry_count, &failure).await;
        }

        if google_books.is_none() || open_library.is_none() {
            warn!(
                job_id = job.job_id,
                google_books = google_books.is_some(),
                open_library = open_library.is_some(),
                "Continuing with a single source"
            );
        }

        let processing =
            self.state_machine
                .transition(job.status, job.retry_count, &JobEvent::ExtractionSucceeded)?;
        self.write(job.job_id, &processing).await?;

        match self
            .reconcile_and_load(job, google_books.as_ref(), open_library.as_ref(), snapshot_date)
            .await
        {
            Ok(receipt) => {
                let completed = self.state_machine.transition(
                    processing.status,
                    processing.retry_count,
                    &JobEvent::Committed,
                )?;
                self.write(job.job_id, &completed).await?;
                Ok(JobOutcome::Completed(receipt))
            }
            Err(e) => {
                self.fail(job.job_id, processing.status, processing.retry_count, &e)
                    .await
            }
        }
    }

    async fn reconcile_and_load(
        &self,
        job: &Job,
        google_books: Option<&SourceDocument>,
        open_library: Option<&SourceDocument>,
        snapshot_date: NaiveDate,
    ) -> Result<LoadReceipt> {
        let record = reconcile::reconcile(google_books, open_library, job.isbn.as_deref())?;
        load_book(&self.pool, &record, snapshot_date).await
    }

    /// Route `failure` through the retry decision and record it
    async fn fail(
        &self,
        job_id: i64,
        status: JobStatus,
        retry_count: u32,
        failure: &PipelineError,
    ) -> Result<JobOutcome> {
        debug!(job_id, kind = failure.kind(), "Applying failure transition");

        let update = self.state_machine.transition(
            status,
            retry_count,
            &JobEvent::Failed(failure.to_string()),
        )?;
        self.write(job_id, &update).await?;

        let error = update.error_message.unwrap_or_else(|| failure.to_string());
        Ok(match update.status {
            JobStatus::Failed => JobOutcome::Failed { error },
            _ => JobOutcome::Retrying {
                retry_count: update.retry_count,
                error,
            },
        })
    }

    async fn write(&self, job_id: i64, update: &JobUpdate) -> Result<()> {
        if jobs::apply_update(&self.pool, job_id, update).await? {
            debug!(job_id, status = %update.status, retry_count = update.retry_count, "Job status written");
            Ok(())
        } else {
            Err(PipelineError::JobUpdate {
                job_id,
                reason: format!("no row affected writing status {}", update.status),
            })
        }
    }
}
