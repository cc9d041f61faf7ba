//! Database Test Utilities

use anyhow::Result;
use shelf_common::PipelineConfig;
use shelf_etl::db::{init_database_pool, jobs};
use shelf_etl::{Job, NewJob};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create temporary file-backed database with the full schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_shelf.db");

    let pool = init_database_pool(&db_path).await?;

    Ok((temp_dir, pool))
}

/// Defaults with the given retry budget; no network values are used
pub fn test_config(max_retries: u32) -> PipelineConfig {
    PipelineConfig {
        retry_max_attempts: max_retries,
        batch_size: 10,
        ..PipelineConfig::default()
    }
}

/// Enqueue a PENDING job and return its id
pub async fn enqueue(pool: &SqlitePool, title: &str, author: &str, isbn: Option<&str>) -> i64 {
    jobs::create_job(
        pool,
        &NewJob {
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.map(str::to_string),
        },
    )
    .await
    .unwrap()
}

pub async fn job_status(pool: &SqlitePool, job_id: i64) -> Job {
    jobs::load_job(pool, job_id)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("job {} missing", job_id))
}

/// Row count of a table by name
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) FROM {}", table);
    sqlx::query_scalar::<_, i64>(&query)
        .fetch_one(pool)
        .await
        .unwrap()
}
