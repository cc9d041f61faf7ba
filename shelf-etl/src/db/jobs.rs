//! Job queue operations
//!
//! Reads PENDING work in creation order and writes state-machine decisions
//! back by `job_id`.

use crate::error::Result;
use crate::job::{Job, JobStatus, JobUpdate, NewJob};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const JOB_COLUMNS: &str =
    "job_id, title, author, isbn, status, retry_count, error_message, created_at, updated_at";

fn job_from_row(row: &SqliteRow) -> Result<Job> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<JobStatus>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Job {
        job_id: row.try_get("job_id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        isbn: row.try_get("isbn")?,
        status,
        retry_count: row.try_get("retry_count")?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Up to `limit` PENDING jobs, oldest first
pub async fn fetch_pending(pool: &SqlitePool, limit: usize) -> Result<Vec<Job>> {
    let sql = format!(
        "SELECT {} FROM jobs WHERE status = ? ORDER BY created_at, job_id LIMIT ?",
        JOB_COLUMNS
    );
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let rows = sqlx::query(&sql)
        .bind(JobStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await?;

    rows.iter().map(job_from_row).collect()
}

pub async fn load_job(pool: &SqlitePool, job_id: i64) -> Result<Option<Job>> {
    let sql = format!("SELECT {} FROM jobs WHERE job_id = ?", JOB_COLUMNS);

    let row = sqlx::query(&sql).bind(job_id).fetch_optional(pool).await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Write a state-machine decision; `false` when no row was affected
pub async fn apply_update(pool: &SqlitePool, job_id: i64, update: &JobUpdate) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET status = ?, retry_count = ?, error_message = ?, updated_at = CURRENT_TIMESTAMP
        WHERE job_id = ?
        "#,
    )
    .bind(update.status.as_str())
    .bind(update.retry_count)
    .bind(&update.error_message)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Enqueue a PENDING job; returns its id
pub async fn create_job(pool: &SqlitePool, job: &NewJob) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO jobs (title, author, isbn, status, retry_count, created_at, updated_at)
        VALUES (?, ?, ?, ?, 0, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&job.title)
    .bind(&job.author)
    .bind(&job.isbn)
    .bind(JobStatus::Pending.as_str())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn job_exists(pool: &SqlitePool, title: &str, author: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM jobs WHERE title = ? AND author = ?)",
    )
    .bind(title)
    .bind(author)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Return every FAILED job to PENDING with a fresh retry budget
pub async fn reset_failed(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET status = ?, retry_count = 0, error_message = NULL, updated_at = CURRENT_TIMESTAMP
        WHERE status = ?
        "#,
    )
    .bind(JobStatus::Pending.as_str())
    .bind(JobStatus::Failed.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count_by_status(pool: &SqlitePool, status: JobStatus) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await?;

    Ok(count)
}
