//! CSV job publisher
//!
//! Turns a curated `Title,Author[,ISBN]` CSV into PENDING jobs. Rows are
//! validated, deduplicated on `(title, author)` against the queue, and
//! enqueued one at a time so a bad row never blocks the rest of the file.

use crate::db::jobs;
use crate::error::PipelineError;
use crate::job::NewJob;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// One CSV data row; missing columns deserialize to `None`
#[derive(Debug, Clone, Deserialize)]
struct CsvRow {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Author", default)]
    author: Option<String>,
    #[serde(rename = "ISBN", default)]
    isbn: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSummary {
    pub total_rows: usize,
    pub jobs_created: usize,
    pub duplicates_skipped: usize,
    pub validation_errors: usize,
    pub database_errors: usize,
}

impl PublishSummary {
    /// False when any insert failed or every row was invalid
    pub fn is_success(&self) -> bool {
        let all_invalid = self.total_rows > 0 && self.validation_errors == self.total_rows;
        self.database_errors == 0 && !all_invalid
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} rows: {} created, {} duplicates, {} invalid, {} database errors",
            self.total_rows,
            self.jobs_created,
            self.duplicates_skipped,
            self.validation_errors,
            self.database_errors
        )
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validated job for a row, or the reason it was rejected
///
/// `row_num` counts the header as row 1.
fn validate_row(row: CsvRow, row_num: usize) -> std::result::Result<NewJob, String> {
    let title = non_empty(row.title).ok_or_else(|| format!("Row {}: missing or empty title", row_num))?;
    let author =
        non_empty(row.author).ok_or_else(|| format!("Row {}: missing or empty author", row_num))?;

    Ok(NewJob {
        title,
        author,
        isbn: non_empty(row.isbn),
    })
}

fn is_unique_violation(err: &PipelineError) -> bool {
    match err {
        PipelineError::Persistence(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}

pub async fn publish_csv(pool: &SqlitePool, path: &Path) -> Result<PublishSummary> {
    info!(path = %path.display(), "Publishing jobs from CSV");

    let file = File::open(path).with_context(|| format!("CSV file not readable: {}", path.display()))?;
    publish_reader(pool, file).await
}

/// Enqueue every valid, new row from `reader`
///
/// Only an unreadable header aborts; malformed records count as
/// validation errors.
pub async fn publish_reader<R: Read>(pool: &SqlitePool, reader: R) -> Result<PublishSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().context("CSV file has no readable header row")?;
    if headers.is_empty() {
        anyhow::bail!("CSV file is empty or has no header row");
    }

    let rows: Vec<csv::Result<CsvRow>> = csv_reader.deserialize().collect();
    let mut summary = PublishSummary {
        total_rows: rows.len(),
        ..PublishSummary::default()
    };

    if rows.is_empty() {
        warn!("CSV file contains no data rows");
        return Ok(summary);
    }

    for (idx, row) in rows.into_iter().enumerate() {
        let row_num = idx + 2;

        let job = match row
            .map_err(|e| format!("Row {}: {}", row_num, e))
            .and_then(|row| validate_row(row, row_num))
        {
            Ok(job) => job,
            Err(reason) => {
                warn!("{}", reason);
                summary.validation_errors += 1;
                continue;
            }
        };

        match jobs::job_exists(pool, &job.title, &job.author).await {
            Ok(true) => {
                debug!(title = %job.title, author = %job.author, "Duplicate job skipped");
                summary.duplicates_skipped += 1;
                continue;
            }
            Ok(false) => {}
            // Fall through; the UNIQUE constraint still guards the insert
            Err(e) => warn!(row = row_num, error = %e, "Duplicate check failed"),
        }

        match jobs::create_job(pool, &job).await {
            Ok(job_id) => {
                debug!(job_id, title = %job.title, "Job created");
                summary.jobs_created += 1;
            }
            Err(e) if is_unique_violation(&e) => {
                summary.duplicates_skipped += 1;
            }
            Err(e) => {
                error!(row = row_num, error = %e, "Failed to create job");
                summary.database_errors += 1;
            }
        }
    }

    info!("Publish complete: {}", summary.display_string());
    Ok(summary)
}
