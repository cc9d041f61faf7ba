//! ISBN resolution for the book natural key

use crate::source::{GoogleBooksView, OpenLibraryView};

/// Strip hyphens and spaces; accept 10- or 13-character ISBNs whose only
/// non-digit is a final check character `X`
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid_len = compact.len() == 10 || compact.len() == 13;
    let (body, check) = compact.split_at(compact.len().saturating_sub(1));
    let valid_chars = body.chars().all(|c| c.is_ascii_digit())
        && check.chars().all(|c| c.is_ascii_digit() || c == 'X');

    if valid_len && valid_chars {
        Some(compact)
    } else {
        None
    }
}

/// First valid ISBN from: the job, Google Books ISBN_13, Google Books
/// ISBN_10, Open Library's first listed ISBN
pub fn resolve_isbn(
    job_isbn: Option<&str>,
    gb: &GoogleBooksView<'_>,
    ol: &OpenLibraryView<'_>,
) -> Option<String> {
    job_isbn
        .and_then(normalize_isbn)
        .or_else(|| gb.industry_identifier("ISBN_13").and_then(normalize_isbn))
        .or_else(|| gb.industry_identifier("ISBN_10").and_then(normalize_isbn))
        .or_else(|| ol.isbns().first().copied().and_then(normalize_isbn))
}
