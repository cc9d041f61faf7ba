//! Source documents and extraction clients
//!
//! A [`SourceDocument`] is the raw JSON a source returned, tagged with its
//! origin. Reconcilers never touch the JSON directly; they read it through
//! the borrowing views in [`google_books`] and [`open_library`], which turn
//! missing or mistyped fields into `None`/empty.

pub mod google_books;
pub mod open_library;

pub use google_books::{GoogleBooksClient, GoogleBooksView};
pub use open_library::{OpenLibraryClient, OpenLibraryView};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shelf_common::PipelineConfig;
use std::fmt;
use std::num::NonZeroU32;

const USER_AGENT: &str = concat!("shelf-etl/", env!("CARGO_PKG_VERSION"));

/// Shared placeholder for absent documents
static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    GoogleBooks,
    OpenLibrary,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::GoogleBooks => write!(f, "Google Books"),
            SourceOrigin::OpenLibrary => write!(f, "Open Library"),
        }
    }
}

/// Origin-tagged raw response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub origin: SourceOrigin,
    pub payload: Value,
}

impl SourceDocument {
    pub fn new(origin: SourceOrigin, payload: Value) -> Self {
        Self { origin, payload }
    }

    /// First record of `list_field`, or null when the document is absent,
    /// from another origin, or empty
    fn first_record<'a>(
        doc: Option<&'a SourceDocument>,
        origin: SourceOrigin,
        list_field: &str,
    ) -> &'a Value {
        doc.filter(|d| d.origin == origin)
            .and_then(|d| d.payload.get(list_field))
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .unwrap_or(&NULL)
    }
}

/// What a source is asked about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookIdentity {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
}

/// Extraction collaborator
///
/// `fetch` never fails: HTTP errors, timeouts, undecodable bodies and
/// empty result sets all come back as `None`.
#[async_trait]
pub trait BookSource: Send + Sync {
    fn origin(&self) -> SourceOrigin;

    async fn fetch(&self, identity: &BookIdentity) -> Option<SourceDocument>;
}

type RateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

fn rate_limiter(config: &PipelineConfig) -> RateLimiter {
    let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
    governor::RateLimiter::direct(governor::Quota::per_second(per_second))
}

fn http_client(config: &PipelineConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(shelf_common::time::secs_to_duration(config.http_timeout_secs))
        .build()
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn str_list_at<'a>(value: &'a Value, pointer: &str) -> Vec<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Array at `pointer` with each slot kept in place; non-strings become `None`
fn str_slots_at<'a>(value: &'a Value, pointer: &str) -> Vec<Option<&'a str>> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(Value::as_str).collect())
        .unwrap_or_default()
}

fn i64_at(value: &Value, pointer: &str) -> Option<i64> {
    value.pointer(pointer).and_then(Value::as_i64)
}

fn f64_at(value: &Value, pointer: &str) -> Option<f64> {
    value.pointer(pointer).and_then(Value::as_f64)
}

fn bool_at(value: &Value, pointer: &str) -> Option<bool> {
    value.pointer(pointer).and_then(Value::as_bool)
}
