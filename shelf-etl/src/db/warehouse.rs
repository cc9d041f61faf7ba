//! Warehouse upserts
//!
//! One function per star-schema table, each keyed by that table's natural
//! key so repeated loads of the same book update rows in place instead of
//! duplicating them. Every function takes a connection rather than the
//! pool so the loader can run all phases of one book in one transaction.

use crate::error::Result;
use crate::reconcile::{
    AuthorDimension, BookDimension, DateDimension, GenreDimension, MetricsFact, PublisherDimension,
};
use sqlx::types::Json;
use sqlx::SqliteConnection;

/// Warehouse tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    DimDate,
    DimPublisher,
    DimAuthor,
    DimGenre,
    DimBooks,
    BookAuthorBridge,
    BookGenreBridge,
    FactBookMetrics,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::DimDate,
        Table::DimPublisher,
        Table::DimAuthor,
        Table::DimGenre,
        Table::DimBooks,
        Table::BookAuthorBridge,
        Table::BookGenreBridge,
        Table::FactBookMetrics,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::DimDate => "dim_date",
            Table::DimPublisher => "dim_publisher",
            Table::DimAuthor => "dim_author",
            Table::DimGenre => "dim_genre",
            Table::DimBooks => "dim_books",
            Table::BookAuthorBridge => "book_author_bridge",
            Table::BookGenreBridge => "book_genre_bridge",
            Table::FactBookMetrics => "fact_book_metrics",
        }
    }

    /// Natural-key columns used as the upsert conflict target
    pub fn conflict_target(&self) -> &'static str {
        match self {
            Table::DimDate => "date_key",
            Table::DimPublisher => "name",
            Table::DimAuthor => "ol_author_key",
            Table::DimGenre => "genre_name",
            Table::DimBooks => "isbn",
            Table::BookAuthorBridge => "isbn, author_id",
            Table::BookGenreBridge => "isbn, genre_id",
            Table::FactBookMetrics => "isbn, snapshot_date_key",
        }
    }

    /// Date rows are immutable once created
    pub fn stamps_updated_at(&self) -> bool {
        !matches!(self, Table::DimDate)
    }
}

/// Book columns refreshed on reload
const BOOK_COLUMNS: &[&str] = &[
    "title",
    "title_has_conflict",
    "description",
    "language",
    "page_count",
    "cover_image_id",
    "publisher_id",
    "publication_date_key",
];

/// Metric columns refreshed when a snapshot is reloaded the same day
const METRIC_COLUMNS: &[&str] = &[
    "rating_avg",
    "rating_count",
    "edition_count",
    "list_price_amount",
    "retail_price_amount",
    "currency_code",
    "is_ebook_available",
    "saleability_status",
];

/// Conflict clause on the table's natural key
///
/// Overwrites `columns` from the incoming row and stamps `updated_at`;
/// immutable tables ignore the incoming row instead.
fn on_conflict(table: Table, columns: &[&str]) -> String {
    if !table.stamps_updated_at() {
        return format!("ON CONFLICT({}) DO NOTHING", table.conflict_target());
    }

    let assignments: Vec<String> = columns
        .iter()
        .map(|column| format!("{column} = excluded.{column}"))
        .chain(std::iter::once("updated_at = CURRENT_TIMESTAMP".to_string()))
        .collect();

    format!(
        "ON CONFLICT({}) DO UPDATE SET {}",
        table.conflict_target(),
        assignments.join(", ")
    )
}

/// Insert-or-ignore; returns the date key
pub async fn upsert_date(conn: &mut SqliteConnection, date: &DateDimension) -> Result<i64> {
    let sql = format!(
        r#"
        INSERT INTO {} (date_key, full_date, year, month, day, quarter, day_of_week, is_weekend)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        {}
        "#,
        Table::DimDate.name(),
        on_conflict(Table::DimDate, &[])
    );

    sqlx::query(&sql)
        .bind(date.date_key)
        .bind(date.full_date.to_string())
        .bind(date.year)
        .bind(date.month)
        .bind(date.day)
        .bind(&date.quarter)
        .bind(&date.day_of_week)
        .bind(date.is_weekend)
        .execute(&mut *conn)
        .await?;

    Ok(date.date_key)
}

/// Returns `publisher_id`
pub async fn upsert_publisher(conn: &mut SqliteConnection, publisher: &PublisherDimension) -> Result<i64> {
    let sql = format!(
        r#"
        INSERT INTO {} (name, updated_at) VALUES (?, CURRENT_TIMESTAMP)
        {}
        RETURNING publisher_id
        "#,
        Table::DimPublisher.name(),
        on_conflict(Table::DimPublisher, &[])
    );

    let publisher_id: i64 = sqlx::query_scalar(&sql)
        .bind(&publisher.name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(publisher_id)
}

/// Returns `author_id`
///
/// Keyed authors upsert on `ol_author_key` (latest spelling wins). Key-less
/// authors reuse an existing key-less row with the exact same name.
pub async fn upsert_author(conn: &mut SqliteConnection, author: &AuthorDimension) -> Result<i64> {
    if let Some(key) = &author.ol_author_key {
        let sql = format!(
            r#"
            INSERT INTO {} (name, ol_author_key, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
            {}
            RETURNING author_id
            "#,
            Table::DimAuthor.name(),
            on_conflict(Table::DimAuthor, &["name"])
        );

        let author_id: i64 = sqlx::query_scalar(&sql)
            .bind(&author.name)
            .bind(key)
            .fetch_one(&mut *conn)
            .await?;

        return Ok(author_id);
    }

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT author_id FROM dim_author WHERE ol_author_key IS NULL AND name = ? ORDER BY author_id LIMIT 1",
    )
    .bind(&author.name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(author_id) = existing {
        sqlx::query("UPDATE dim_author SET updated_at = CURRENT_TIMESTAMP WHERE author_id = ?")
            .bind(author_id)
            .execute(&mut *conn)
            .await?;
        return Ok(author_id);
    }

    let author_id: i64 = sqlx::query_scalar(
        "INSERT INTO dim_author (name, ol_author_key, updated_at) VALUES (?, NULL, CURRENT_TIMESTAMP) RETURNING author_id",
    )
    .bind(&author.name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(author_id)
}

/// Returns `genre_id`
pub async fn upsert_genre(conn: &mut SqliteConnection, genre: &GenreDimension) -> Result<i64> {
    let sql = format!(
        r#"
        INSERT INTO {} (genre_name, updated_at) VALUES (?, CURRENT_TIMESTAMP)
        {}
        RETURNING genre_id
        "#,
        Table::DimGenre.name(),
        on_conflict(Table::DimGenre, &[])
    );

    let genre_id: i64 = sqlx::query_scalar(&sql)
        .bind(&genre.genre_name)
        .fetch_one(&mut *conn)
        .await?;

    Ok(genre_id)
}

/// Returns `book_id`; publisher and publication date are phase-1 keys
pub async fn upsert_book(
    conn: &mut SqliteConnection,
    book: &BookDimension,
    publisher_id: Option<i64>,
    publication_date_key: Option<i64>,
) -> Result<i64> {
    let sql = format!(
        r#"
        INSERT INTO {} (
            isbn, title, title_has_conflict, description, language, page_count,
            cover_image_id, publisher_id, publication_date_key, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        {}
        RETURNING book_id
        "#,
        Table::DimBooks.name(),
        on_conflict(Table::DimBooks, BOOK_COLUMNS)
    );

    let book_id: i64 = sqlx::query_scalar(&sql)
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(book.title_has_conflict)
        .bind(&book.description)
        .bind(book.language.as_ref().map(Json))
        .bind(book.page_count)
        .bind(&book.cover_image_id)
        .bind(publisher_id)
        .bind(publication_date_key)
        .fetch_one(&mut *conn)
        .await?;

    Ok(book_id)
}

pub async fn link_book_author(conn: &mut SqliteConnection, isbn: &str, author_id: i64) -> Result<()> {
    let sql = format!(
        r#"
        INSERT INTO {} (isbn, author_id, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        {}
        "#,
        Table::BookAuthorBridge.name(),
        on_conflict(Table::BookAuthorBridge, &[])
    );

    sqlx::query(&sql)
        .bind(isbn)
        .bind(author_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn link_book_genre(conn: &mut SqliteConnection, isbn: &str, genre_id: i64) -> Result<()> {
    let sql = format!(
        r#"
        INSERT INTO {} (isbn, genre_id, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        {}
        "#,
        Table::BookGenreBridge.name(),
        on_conflict(Table::BookGenreBridge, &[])
    );

    sqlx::query(&sql)
        .bind(isbn)
        .bind(genre_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Returns `metric_id`; one row per book per snapshot date
pub async fn upsert_metrics(
    conn: &mut SqliteConnection,
    isbn: &str,
    snapshot_date_key: i64,
    metrics: &MetricsFact,
) -> Result<i64> {
    let sql = format!(
        r#"
        INSERT INTO {} (
            isbn, snapshot_date_key, rating_avg, rating_count, edition_count,
            list_price_amount, retail_price_amount, currency_code,
            is_ebook_available, saleability_status, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        {}
        RETURNING metric_id
        "#,
        Table::FactBookMetrics.name(),
        on_conflict(Table::FactBookMetrics, METRIC_COLUMNS)
    );

    let metric_id: i64 = sqlx::query_scalar(&sql)
        .bind(isbn)
        .bind(snapshot_date_key)
        .bind(metrics.rating_avg)
        .bind(metrics.rating_count)
        .bind(metrics.edition_count)
        .bind(metrics.list_price_amount)
        .bind(metrics.retail_price_amount)
        .bind(&metrics.currency_code)
        .bind(metrics.is_ebook_available)
        .bind(&metrics.saleability_status)
        .fetch_one(&mut *conn)
        .await?;

    Ok(metric_id)
}

/// Row count of one table
pub async fn count_rows(conn: &mut SqliteConnection, table: Table) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.name());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    Ok(count)
}
