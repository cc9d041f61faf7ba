//! Multi-source reconciliation
//!
//! Turns the Google Books and Open Library documents for one book into the
//! canonical warehouse records, in foreign-key order:
//! 1. Independent dimensions: date, publisher, authors, genres
//! 2. Dependent dimension: book
//! 3. Fact: metrics
//!
//! Reconciliation is a pure function of the two documents. The same inputs
//! always produce identical records, which is what makes the natural-key
//! upserts in the loader idempotent.

pub mod author;
pub mod book;
pub mod date;
pub mod genre;
pub mod isbn;
pub mod metrics;
pub mod publisher;

use crate::error::{PipelineError, Result};
use crate::source::{GoogleBooksView, OpenLibraryView, SourceDocument};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateDimension {
    /// `YYYYMMDD`, natural key
    pub date_key: i64,
    pub full_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// "Q1" to "Q4"
    pub quarter: String,
    pub day_of_week: String,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherDimension {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDimension {
    pub name: String,
    /// Natural key when present; key-less authors are matched by name
    pub ol_author_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDimension {
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDimension {
    /// Natural key
    pub isbn: String,
    pub title: String,
    pub title_has_conflict: bool,
    pub description: String,
    /// Sorted ISO 639-1 codes
    pub language: Option<Vec<String>>,
    /// Never zero
    pub page_count: Option<i64>,
    pub cover_image_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsFact {
    pub rating_avg: Option<f64>,
    pub rating_count: Option<i64>,
    pub edition_count: Option<i64>,
    pub list_price_amount: Option<f64>,
    pub retail_price_amount: Option<f64>,
    pub currency_code: Option<String>,
    pub is_ebook_available: bool,
    pub saleability_status: Option<String>,
}

/// Phase 1 output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndependentDimensions {
    pub date: Option<DateDimension>,
    pub publisher: Option<PublisherDimension>,
    pub authors: Vec<AuthorDimension>,
    pub genres: Vec<GenreDimension>,
}

/// Everything the loader needs for one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledBook {
    pub independent: IndependentDimensions,
    pub book: BookDimension,
    pub metrics: MetricsFact,
}

pub fn reconcile_independent(gb: &GoogleBooksView<'_>, ol: &OpenLibraryView<'_>) -> IndependentDimensions {
    let dimensions = IndependentDimensions {
        date: date::reconcile_date(gb.published_date()),
        publisher: publisher::reconcile_publisher(gb),
        authors: author::reconcile_authors(gb, ol),
        genres: genre::reconcile_genres(gb),
    };

    debug!(
        has_date = dimensions.date.is_some(),
        has_publisher = dimensions.publisher.is_some(),
        authors = dimensions.authors.len(),
        genres = dimensions.genres.len(),
        "Independent dimensions reconciled"
    );

    dimensions
}

/// Reconcile both documents into one record set
///
/// At least one document must be present. Fails only when no ISBN can be
/// resolved for the book's natural key; every other gap degrades to an
/// empty field.
pub fn reconcile(
    google_books: Option<&SourceDocument>,
    open_library: Option<&SourceDocument>,
    job_isbn: Option<&str>,
) -> Result<ReconciledBook> {
    let gb = GoogleBooksView::new(google_books);
    let ol = OpenLibraryView::new(open_library);

    if gb.is_empty() && ol.is_empty() {
        return Err(PipelineError::Reconciliation(
            "no source document to reconcile".to_string(),
        ));
    }

    let isbn = isbn::resolve_isbn(job_isbn, &gb, &ol).ok_or_else(|| {
        PipelineError::Reconciliation("no ISBN available from job or sources".to_string())
    })?;

    let independent = reconcile_independent(&gb, &ol);
    let book = book::reconcile_book(&isbn, &gb, &ol);
    let metrics = metrics::reconcile_metrics(&gb, &ol);

    info!(
        isbn = %book.isbn,
        title = %book.title,
        title_has_conflict = book.title_has_conflict,
        "Book reconciled"
    );

    Ok(ReconciledBook {
        independent,
        book,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceOrigin;
    use serde_json::json;

    fn google_books() -> SourceDocument {
        SourceDocument::new(
            SourceOrigin::GoogleBooks,
            json!({"items": [{
                "volumeInfo": {
                    "title": "Turtles All the Way Down",
                    "authors": ["John Green"],
                    "publisher": "PENGUIN BOOKS LTD.",
                    "publishedDate": "2017-10-10",
                    "categories": ["Young Adult Fiction"],
                    "language": "en",
                    "pageCount": 304,
                    "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9780525555360"}]
                },
                "saleInfo": {"saleability": "NOT_FOR_SALE", "isEbook": false}
            }]}),
        )
    }

    fn open_library() -> SourceDocument {
        SourceDocument::new(
            SourceOrigin::OpenLibrary,
            json!({"docs": [{
                "title": "Turtles All the Way Down (Hardcover)",
                "author_name": ["John Green"],
                "author_key": ["OL5206467A"],
                "language": ["eng", "spa"],
                "edition_count": 34
            }]}),
        )
    }

    #[test]
    fn test_full_reconciliation() {
        let gb = google_books();
        let ol = open_library();

        let result = reconcile(Some(&gb), Some(&ol), None).unwrap();

        assert_eq!(result.book.isbn, "9780525555360");
        assert_eq!(result.book.title, "Turtles All the Way Down");
        assert!(!result.book.title_has_conflict);
        assert_eq!(result.book.language, Some(vec!["en".to_string(), "es".to_string()]));
        assert_eq!(result.independent.date.as_ref().map(|d| d.date_key), Some(20171010));
        assert_eq!(
            result.independent.publisher,
            Some(PublisherDimension { name: "Penguin Books Ltd".to_string() })
        );
        assert_eq!(
            result.independent.authors,
            vec![AuthorDimension {
                name: "John Green".to_string(),
                ol_author_key: Some("OL5206467A".to_string()),
            }]
        );
        assert_eq!(result.independent.genres.len(), 1);
        assert_eq!(result.metrics.edition_count, Some(34));
    }

    #[test]
    fn test_reconciliation_is_pure() {
        let gb = google_books();
        let ol = open_library();

        let first = reconcile(Some(&gb), Some(&ol), None).unwrap();
        let second = reconcile(Some(&gb), Some(&ol), None).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_single_source_degrades() {
        let gb = google_books();

        let result = reconcile(Some(&gb), None, None).unwrap();

        // Author merge needs both sources
        assert!(result.independent.authors.is_empty());
        assert_eq!(result.metrics.edition_count, None);
        assert_eq!(result.book.language, Some(vec!["en".to_string()]));
    }

    #[test]
    fn test_missing_isbn_is_reconciliation_error() {
        let ol = open_library();

        let result = reconcile(None, Some(&ol), None);

        assert!(matches!(result, Err(PipelineError::Reconciliation(_))));
    }

    #[test]
    fn test_no_documents_is_error() {
        assert!(matches!(reconcile(None, None, Some("9780525555360")), Err(PipelineError::Reconciliation(_))));
    }
}
