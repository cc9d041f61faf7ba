//! Book dimension reconciler: title, language and descriptive fields

use super::BookDimension;
use crate::normalize::{clean_title, normalize_language_code};
use crate::similarity;
use crate::source::{GoogleBooksView, OpenLibraryView};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Minimum similarity for two titles to differ only in formatting
pub const TITLE_MATCH_THRESHOLD: f64 = 0.9;

/// Merge cleaned titles; returns `(title, title_has_conflict)`
///
/// Google Books is primary. Similar titles keep the longer one (it usually
/// carries the subtitle), the primary on equal length. Dissimilar titles
/// keep the primary and raise the conflict flag.
pub fn merge_titles(primary: Option<&str>, secondary: Option<&str>) -> (Option<String>, bool) {
    match (primary, secondary) {
        (None, None) => (None, false),
        (Some(title), None) | (None, Some(title)) => (Some(title.to_string()), false),
        (Some(primary), Some(secondary)) => {
            let score = similarity::ratio(primary, secondary);
            if score >= TITLE_MATCH_THRESHOLD {
                let preferred = if primary.chars().count() >= secondary.chars().count() {
                    primary
                } else {
                    secondary
                };
                (Some(preferred.to_string()), false)
            } else {
                warn!(primary = %primary, secondary = %secondary, score, "Title conflict between sources");
                (Some(primary.to_string()), true)
            }
        }
    }
}

/// Union of the work-level list and the edition-level language, normalized,
/// deduplicated and sorted; `None` when nothing normalizes
pub fn merge_languages(edition_language: Option<&str>, work_languages: &[&str]) -> Option<Vec<String>> {
    let merged: BTreeSet<String> = work_languages
        .iter()
        .copied()
        .chain(edition_language)
        .filter_map(|code| normalize_language_code(Some(code)))
        .collect();

    if merged.is_empty() {
        None
    } else {
        Some(merged.into_iter().collect())
    }
}

/// Book dimension for the resolved ISBN
pub fn reconcile_book(isbn: &str, gb: &GoogleBooksView<'_>, ol: &OpenLibraryView<'_>) -> BookDimension {
    let gb_title = clean_title(gb.title());
    let ol_title = clean_title(ol.title());
    let (title, title_has_conflict) = merge_titles(gb_title.as_deref(), ol_title.as_deref());

    if title.is_none() {
        warn!(isbn = %isbn, "No usable title from either source");
    }

    let language = merge_languages(gb.language(), &ol.languages());
    debug!(isbn = %isbn, ?language, "Languages merged");

    BookDimension {
        isbn: isbn.to_string(),
        title: title.unwrap_or_default(),
        title_has_conflict,
        description: gb.description().unwrap_or_default().to_string(),
        language,
        page_count: gb.page_count().filter(|count| *count > 0),
        cover_image_id: gb
            .thumbnail()
            .filter(|url| !url.is_empty())
            .map(str::to_string),
    }
}
