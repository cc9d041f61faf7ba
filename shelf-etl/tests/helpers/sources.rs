//! In-process source fakes and canned documents

use async_trait::async_trait;
use serde_json::json;
use shelf_etl::{BookIdentity, BookSource, SourceDocument, SourceOrigin};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Source returning the same canned answer for every identity
pub struct FakeSource {
    origin: SourceOrigin,
    document: Option<SourceDocument>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn returning(origin: SourceOrigin, document: Option<SourceDocument>) -> Arc<Self> {
        Arc::new(Self {
            origin,
            document,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty(origin: SourceOrigin) -> Arc<Self> {
        Self::returning(origin, None)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BookSource for FakeSource {
    fn origin(&self) -> SourceOrigin {
        self.origin
    }

    async fn fetch(&self, _identity: &BookIdentity) -> Option<SourceDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.document.clone()
    }
}

/// Google Books search response for "Turtles All the Way Down"
pub fn google_books_doc() -> SourceDocument {
    SourceDocument::new(
        SourceOrigin::GoogleBooks,
        json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Turtles All the Way Down",
                    "authors": ["John Green"],
                    "publisher": "PENGUIN BOOKS LTD.",
                    "publishedDate": "2017-10-10",
                    "description": "Aza Holmes never intended to pursue the mystery.",
                    "categories": ["Young Adult Fiction", "Fiction / Mental Illness"],
                    "language": "en",
                    "pageCount": 304,
                    "imageLinks": {"thumbnail": "http://books.google.com/books/content?id=abc"},
                    "averageRating": 4.0,
                    "ratingsCount": 212,
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "0525555366"},
                        {"type": "ISBN_13", "identifier": "9780525555360"}
                    ]
                },
                "saleInfo": {
                    "saleability": "FOR_SALE",
                    "isEbook": true,
                    "listPrice": {"amount": 11.99, "currencyCode": "USD"},
                    "retailPrice": {"amount": 9.99, "currencyCode": "USD"}
                }
            }]
        }),
    )
}

/// Open Library search response for the same book
pub fn open_library_doc() -> SourceDocument {
    SourceDocument::new(
        SourceOrigin::OpenLibrary,
        json!({
            "numFound": 1,
            "docs": [{
                "title": "Turtles All the Way Down (Hardcover)",
                "author_name": ["John Green"],
                "author_key": ["OL5206467A"],
                "language": ["eng", "spa"],
                "edition_count": 34,
                "isbn": ["9780525555360", "0525555366"]
            }]
        }),
    )
}
