//! Warehouse loader
//!
//! Writes one reconciled book in foreign-key order inside a single
//! transaction. A failure in any phase rolls back every phase, so a book is
//! either fully loaded for the snapshot date or not at all.

use crate::db::warehouse;
use crate::error::Result;
use crate::reconcile::{DateDimension, ReconciledBook};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

/// Surrogate keys produced by one load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReceipt {
    pub book_id: i64,
    pub metric_id: i64,
    pub snapshot_date_key: i64,
    pub publication_date_key: Option<i64>,
    pub publisher_id: Option<i64>,
    pub author_ids: Vec<i64>,
    pub genre_ids: Vec<i64>,
}

/// Load `record` with metrics attributed to `snapshot_date`
pub async fn load_book(
    pool: &SqlitePool,
    record: &ReconciledBook,
    snapshot_date: NaiveDate,
) -> Result<LoadReceipt> {
    let isbn = record.book.isbn.as_str();
    let mut tx = pool.begin().await?;

    // Phase 1: independent dimensions
    let snapshot_date_key =
        warehouse::upsert_date(&mut tx, &DateDimension::from_date(snapshot_date)).await?;

    let publication_date_key = match &record.independent.date {
        Some(date) => Some(warehouse::upsert_date(&mut tx, date).await?),
        None => None,
    };

    let publisher_id = match &record.independent.publisher {
        Some(publisher) => Some(warehouse::upsert_publisher(&mut tx, publisher).await?),
        None => None,
    };

    let mut author_ids = Vec::with_capacity(record.independent.authors.len());
    for author in &record.independent.authors {
        author_ids.push(warehouse::upsert_author(&mut tx, author).await?);
    }

    let mut genre_ids = Vec::with_capacity(record.independent.genres.len());
    for genre in &record.independent.genres {
        genre_ids.push(warehouse::upsert_genre(&mut tx, genre).await?);
    }

    debug!(isbn = %isbn, authors = author_ids.len(), genres = genre_ids.len(), "Phase 1 loaded");

    // Phase 2: book
    let book_id =
        warehouse::upsert_book(&mut tx, &record.book, publisher_id, publication_date_key).await?;

    // Phase 3: bridges
    for author_id in &author_ids {
        warehouse::link_book_author(&mut tx, isbn, *author_id).await?;
    }
    for genre_id in &genre_ids {
        warehouse::link_book_genre(&mut tx, isbn, *genre_id).await?;
    }

    // Phase 4: fact
    let metric_id =
        warehouse::upsert_metrics(&mut tx, isbn, snapshot_date_key, &record.metrics).await?;

    tx.commit().await?;

    debug!(isbn = %isbn, book_id, metric_id, snapshot_date_key, "Book loaded");

    Ok(LoadReceipt {
        book_id,
        metric_id,
        snapshot_date_key,
        publication_date_key,
        publisher_id,
        author_ids,
        genre_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::warehouse::{count_rows, Table};
    use crate::reconcile::{
        AuthorDimension, BookDimension, GenreDimension, IndependentDimensions, MetricsFact,
        PublisherDimension,
    };
    use shelf_common::db::init_memory_database;

    fn record() -> ReconciledBook {
        ReconciledBook {
            independent: IndependentDimensions {
                date: Some(DateDimension::from_date(NaiveDate::from_ymd_opt(1965, 8, 1).unwrap())),
                publisher: Some(PublisherDimension { name: "Chilton Books".to_string() }),
                authors: vec![AuthorDimension {
                    name: "Frank Herbert".to_string(),
                    ol_author_key: Some("OL79034A".to_string()),
                }],
                genres: vec![GenreDimension { genre_name: "science fiction".to_string() }],
            },
            book: BookDimension {
                isbn: "9780441172719".to_string(),
                title: "Dune".to_string(),
                title_has_conflict: false,
                description: String::new(),
                language: Some(vec!["en".to_string()]),
                page_count: Some(412),
                cover_image_id: None,
            },
            metrics: MetricsFact {
                rating_avg: Some(4.5),
                rating_count: Some(120),
                ..MetricsFact::default()
            },
        }
    }

    #[tokio::test]
    async fn test_load_is_idempotent_per_snapshot() {
        let pool = init_memory_database().await.unwrap();
        let snapshot = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        let first = load_book(&pool, &record(), snapshot).await.unwrap();
        let second = load_book(&pool, &record(), snapshot).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.snapshot_date_key, 20240315);
        assert_eq!(first.publication_date_key, Some(19650801));

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(count_rows(&mut conn, Table::DimDate).await.unwrap(), 2);
        for table in [
            Table::DimPublisher,
            Table::DimAuthor,
            Table::DimGenre,
            Table::DimBooks,
            Table::BookAuthorBridge,
            Table::BookGenreBridge,
            Table::FactBookMetrics,
        ] {
            assert_eq!(count_rows(&mut conn, table).await.unwrap(), 1, "{}", table.name());
        }
    }

    #[tokio::test]
    async fn test_new_snapshot_adds_fact_row() {
        let pool = init_memory_database().await.unwrap();

        load_book(&pool, &record(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
            .await
            .unwrap();
        load_book(&pool, &record(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap())
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert_eq!(count_rows(&mut conn, Table::FactBookMetrics).await.unwrap(), 2);
        assert_eq!(count_rows(&mut conn, Table::DimBooks).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_phase_rolls_back_everything() {
        let pool = init_memory_database().await.unwrap();
        let mut bad = record();
        // Violates the page_count CHECK in phase 2
        bad.book.page_count = Some(-1);

        let result = load_book(&pool, &bad, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()).await;
        assert!(result.is_err());

        let mut conn = pool.acquire().await.unwrap();
        for table in Table::ALL {
            assert_eq!(count_rows(&mut conn, table).await.unwrap(), 0, "{}", table.name());
        }
    }
}
