//! Google Books volumes API
//!
//! Primary source for title, publication date, publisher, categories,
//! description, page count, cover, pricing, ratings and the edition-level
//! language.

use super::{
    bool_at, f64_at, http_client, i64_at, rate_limiter, str_at, str_list_at, BookIdentity,
    BookSource, RateLimiter, SourceDocument, SourceOrigin,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use shelf_common::PipelineConfig;
use tracing::{debug, warn};

pub struct GoogleBooksClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config).context("Failed to build Google Books HTTP client")?,
            rate_limiter: rate_limiter(config),
            base_url: config.google_books_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `q` parameter: ISBN lookup when available, else title + author
    fn query(identity: &BookIdentity) -> String {
        match identity.isbn.as_deref().filter(|isbn| !isbn.is_empty()) {
            Some(isbn) => format!("isbn:{}", isbn),
            None => format!("intitle:{} inauthor:{}", identity.title, identity.author),
        }
    }

    async fn request(&self, identity: &BookIdentity) -> Result<Option<SourceDocument>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/volumes", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", Self::query(identity).as_str()), ("maxResults", "1")])
            .send()
            .await
            .context("Google Books API request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Google Books API returned error: {}", response.status());
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse Google Books response")?;

        let has_items = payload
            .get("items")
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty());

        if !has_items {
            return Ok(None);
        }

        Ok(Some(SourceDocument::new(SourceOrigin::GoogleBooks, payload)))
    }
}

#[async_trait]
impl BookSource for GoogleBooksClient {
    fn origin(&self) -> SourceOrigin {
        SourceOrigin::GoogleBooks
    }

    async fn fetch(&self, identity: &BookIdentity) -> Option<SourceDocument> {
        match self.request(identity).await {
            Ok(Some(doc)) => {
                debug!(title = %identity.title, "Google Books match found");
                Some(doc)
            }
            Ok(None) => {
                warn!(title = %identity.title, author = %identity.author, "Google Books returned no results");
                None
            }
            Err(e) => {
                warn!(title = %identity.title, error = %format!("{:#}", e), "Google Books fetch failed");
                None
            }
        }
    }
}

/// Read-only view over `items[0]` of a Google Books response
#[derive(Debug, Clone, Copy)]
pub struct GoogleBooksView<'a> {
    item: &'a Value,
}

impl<'a> GoogleBooksView<'a> {
    /// View over `doc`; an absent or foreign document yields an all-empty view
    pub fn new(doc: Option<&'a SourceDocument>) -> Self {
        Self {
            item: SourceDocument::first_record(doc, SourceOrigin::GoogleBooks, "items"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_null()
    }

    pub fn title(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/title")
    }

    pub fn authors(&self) -> Vec<&'a str> {
        str_list_at(self.item, "/volumeInfo/authors")
    }

    pub fn publisher(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/publisher")
    }

    pub fn published_date(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/publishedDate")
    }

    pub fn description(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/description")
    }

    pub fn categories(&self) -> Vec<&'a str> {
        str_list_at(self.item, "/volumeInfo/categories")
    }

    /// Edition-level language
    pub fn language(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/language")
    }

    pub fn page_count(&self) -> Option<i64> {
        i64_at(self.item, "/volumeInfo/pageCount")
    }

    pub fn thumbnail(&self) -> Option<&'a str> {
        str_at(self.item, "/volumeInfo/imageLinks/thumbnail")
    }

    pub fn average_rating(&self) -> Option<f64> {
        f64_at(self.item, "/volumeInfo/averageRating")
    }

    pub fn ratings_count(&self) -> Option<i64> {
        i64_at(self.item, "/volumeInfo/ratingsCount")
    }

    /// Identifier of the given type ("ISBN_13", "ISBN_10")
    pub fn industry_identifier(&self, kind: &str) -> Option<&'a str> {
        self.item
            .pointer("/volumeInfo/industryIdentifiers")
            .and_then(Value::as_array)?
            .iter()
            .find(|id| str_at(id, "/type") == Some(kind))
            .and_then(|id| str_at(id, "/identifier"))
    }

    pub fn list_price_amount(&self) -> Option<f64> {
        f64_at(self.item, "/saleInfo/listPrice/amount")
    }

    pub fn list_price_currency(&self) -> Option<&'a str> {
        str_at(self.item, "/saleInfo/listPrice/currencyCode")
    }

    pub fn retail_price_amount(&self) -> Option<f64> {
        f64_at(self.item, "/saleInfo/retailPrice/amount")
    }

    pub fn retail_price_currency(&self) -> Option<&'a str> {
        str_at(self.item, "/saleInfo/retailPrice/currencyCode")
    }

    pub fn is_ebook(&self) -> Option<bool> {
        bool_at(self.item, "/saleInfo/isEbook")
    }

    pub fn saleability(&self) -> Option<&'a str> {
        str_at(self.item, "/saleInfo/saleability")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SourceDocument {
        SourceDocument::new(
            SourceOrigin::GoogleBooks,
            json!({
                "totalItems": 1,
                "items": [{
                    "volumeInfo": {
                        "title": "Dune",
                        "authors": ["Frank Herbert"],
                        "pageCount": 412,
                        "industryIdentifiers": [
                            {"type": "ISBN_10", "identifier": "0441172717"},
                            {"type": "ISBN_13", "identifier": "9780441172719"}
                        ]
                    },
                    "saleInfo": {"isEbook": true, "listPrice": {"amount": 9.99, "currencyCode": "USD"}}
                }]
            }),
        )
    }

    #[test]
    fn test_view_reads_first_item() {
        let doc = sample();
        let view = GoogleBooksView::new(Some(&doc));

        assert!(!view.is_empty());
        assert_eq!(view.title(), Some("Dune"));
        assert_eq!(view.authors(), vec!["Frank Herbert"]);
        assert_eq!(view.page_count(), Some(412));
        assert_eq!(view.industry_identifier("ISBN_13"), Some("9780441172719"));
        assert_eq!(view.industry_identifier("ISBN_10"), Some("0441172717"));
        assert_eq!(view.list_price_currency(), Some("USD"));
        assert_eq!(view.is_ebook(), Some(true));
        assert_eq!(view.retail_price_amount(), None);
    }

    #[test]
    fn test_absent_document_is_empty_view() {
        let view = GoogleBooksView::new(None);

        assert!(view.is_empty());
        assert_eq!(view.title(), None);
        assert!(view.categories().is_empty());
        assert_eq!(view.industry_identifier("ISBN_13"), None);
    }

    #[test]
    fn test_query_shapes() {
        let mut identity = BookIdentity {
            isbn: Some("9780441172719".to_string()),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
        };
        assert_eq!(GoogleBooksClient::query(&identity), "isbn:9780441172719");

        identity.isbn = None;
        assert_eq!(GoogleBooksClient::query(&identity), "intitle:Dune inauthor:Frank Herbert");
    }
}
