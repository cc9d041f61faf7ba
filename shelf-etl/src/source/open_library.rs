//! Open Library search API
//!
//! Primary source for author keys and edition count; supplies the
//! work-level language list (all translations).

use super::{
    http_client, i64_at, rate_limiter, str_at, str_list_at, str_slots_at, BookIdentity,
    BookSource, RateLimiter, SourceDocument, SourceOrigin,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use shelf_common::PipelineConfig;
use tracing::{debug, warn};

pub struct OpenLibraryClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config).context("Failed to build Open Library HTTP client")?,
            rate_limiter: rate_limiter(config),
            base_url: config.open_library_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query parameters: `isbn=` lookup when available, else free-text `q=`
    fn query(identity: &BookIdentity) -> (&'static str, String) {
        match identity.isbn.as_deref().filter(|isbn| !isbn.is_empty()) {
            Some(isbn) => ("isbn", isbn.to_string()),
            None => ("q", format!("{} {}", identity.title, identity.author)),
        }
    }

    async fn request(&self, identity: &BookIdentity) -> Result<Option<SourceDocument>> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/search.json", self.base_url);
        let (key, value) = Self::query(identity);
        let response = self
            .client
            .get(&url)
            .query(&[(key, value.as_str()), ("limit", "1")])
            .send()
            .await
            .context("Open Library API request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Open Library API returned error: {}", response.status());
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse Open Library response")?;

        let has_docs = payload
            .get("docs")
            .and_then(Value::as_array)
            .is_some_and(|docs| !docs.is_empty());

        if !has_docs {
            return Ok(None);
        }

        Ok(Some(SourceDocument::new(SourceOrigin::OpenLibrary, payload)))
    }
}

#[async_trait]
impl BookSource for OpenLibraryClient {
    fn origin(&self) -> SourceOrigin {
        SourceOrigin::OpenLibrary
    }

    async fn fetch(&self, identity: &BookIdentity) -> Option<SourceDocument> {
        match self.request(identity).await {
            Ok(Some(doc)) => {
                debug!(title = %identity.title, "Open Library match found");
                Some(doc)
            }
            Ok(None) => {
                warn!(title = %identity.title, author = %identity.author, "Open Library returned no results");
                None
            }
            Err(e) => {
                warn!(title = %identity.title, error = %format!("{:#}", e), "Open Library fetch failed");
                None
            }
        }
    }
}

/// Read-only view over `docs[0]` of an Open Library search response
#[derive(Debug, Clone, Copy)]
pub struct OpenLibraryView<'a> {
    doc: &'a Value,
}

impl<'a> OpenLibraryView<'a> {
    /// View over `doc`; an absent or foreign document yields an all-empty view
    pub fn new(doc: Option<&'a SourceDocument>) -> Self {
        Self {
            doc: SourceDocument::first_record(doc, SourceOrigin::OpenLibrary, "docs"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_null()
    }

    pub fn title(&self) -> Option<&'a str> {
        str_at(self.doc, "/title")
    }

    /// `(name, key)` pairs matched by position in `author_name` and
    /// `author_key`, before any malformed slot is dropped
    pub fn authors(&self) -> Vec<(Option<&'a str>, Option<&'a str>)> {
        let keys = str_slots_at(self.doc, "/author_key");

        str_slots_at(self.doc, "/author_name")
            .into_iter()
            .enumerate()
            .map(|(idx, name)| (name, keys.get(idx).copied().flatten()))
            .collect()
    }

    pub fn languages(&self) -> Vec<&'a str> {
        str_list_at(self.doc, "/language")
    }

    pub fn edition_count(&self) -> Option<i64> {
        i64_at(self.doc, "/edition_count")
    }

    pub fn isbns(&self) -> Vec<&'a str> {
        str_list_at(self.doc, "/isbn")
    }
}
