//! Database access for shelf-etl
//!
//! The job queue and the warehouse share one SQLite file; the schema is
//! owned by `shelf_common::db`.

pub mod jobs;
pub mod warehouse;

use crate::error::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the pipeline database, creating file and tables when missing
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());
    let pool = shelf_common::db::init_database(db_path).await?;
    Ok(pool)
}
