//! Database initialization
//!
//! Opens (or creates) the SQLite store holding the job queue and the
//! star-schema warehouse, then creates every table idempotently.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    // Jobs are processed one at a time; a small pool is enough.
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Every connection to `sqlite::memory:` is a separate database, so the
/// pool is pinned to one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_jobs_table(pool).await?;

    // Phase 1 targets
    create_dim_date_table(pool).await?;
    create_dim_publisher_table(pool).await?;
    create_dim_author_table(pool).await?;
    create_dim_genre_table(pool).await?;

    // Phase 2
    create_dim_books_table(pool).await?;

    // Phase 3
    create_book_author_bridge_table(pool).await?;
    create_book_genre_bridge_table(pool).await?;

    // Phase 4
    create_fact_book_metrics_table(pool).await?;

    Ok(())
}

/// Queue of books awaiting reconciliation
pub async fn create_jobs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            job_id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            isbn TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
            retry_count INTEGER NOT NULL DEFAULT 0 CHECK (retry_count >= 0),
            error_message TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (title, author)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status, created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Date dimension; rows are immutable once created
async fn create_dim_date_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_date (
            date_key INTEGER PRIMARY KEY,
            full_date TEXT NOT NULL,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            day INTEGER NOT NULL CHECK (day BETWEEN 1 AND 31),
            quarter TEXT NOT NULL CHECK (quarter IN ('Q1', 'Q2', 'Q3', 'Q4')),
            day_of_week TEXT NOT NULL,
            is_weekend INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_dim_publisher_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_publisher (
            publisher_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Author dimension
///
/// `ol_author_key` is nullable; SQLite treats NULLs as distinct under
/// UNIQUE, so key-less authors are deduplicated by name in the loader.
async fn create_dim_author_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_author (
            author_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            ol_author_key TEXT UNIQUE,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_dim_author_name ON dim_author(name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_dim_genre_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_genre (
            genre_id INTEGER PRIMARY KEY AUTOINCREMENT,
            genre_name TEXT NOT NULL UNIQUE CHECK (length(genre_name) <= 100),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Book dimension
///
/// `language` holds a JSON array of ISO 639-1 codes.
async fn create_dim_books_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dim_books (
            book_id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            title_has_conflict INTEGER NOT NULL DEFAULT 0,
            description TEXT NOT NULL DEFAULT '',
            language TEXT,
            page_count INTEGER CHECK (page_count IS NULL OR page_count > 0),
            cover_image_id TEXT,
            publisher_id INTEGER REFERENCES dim_publisher(publisher_id),
            publication_date_key INTEGER REFERENCES dim_date(date_key),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_book_author_bridge_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_author_bridge (
            isbn TEXT NOT NULL REFERENCES dim_books(isbn) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES dim_author(author_id) ON DELETE CASCADE,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (isbn, author_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_book_genre_bridge_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS book_genre_bridge (
            isbn TEXT NOT NULL REFERENCES dim_books(isbn) ON DELETE CASCADE,
            genre_id INTEGER NOT NULL REFERENCES dim_genre(genre_id) ON DELETE CASCADE,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (isbn, genre_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Metrics fact, one row per book per snapshot date
async fn create_fact_book_metrics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS fact_book_metrics (
            metric_id INTEGER PRIMARY KEY AUTOINCREMENT,
            isbn TEXT NOT NULL REFERENCES dim_books(isbn) ON DELETE CASCADE,
            snapshot_date_key INTEGER NOT NULL REFERENCES dim_date(date_key),
            rating_avg REAL,
            rating_count INTEGER,
            edition_count INTEGER,
            list_price_amount REAL,
            retail_price_amount REAL,
            currency_code TEXT,
            is_ebook_available INTEGER NOT NULL DEFAULT 0,
            saleability_status TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (isbn, snapshot_date_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
