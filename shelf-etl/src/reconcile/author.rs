//! Author reconciler
//!
//! Open Library is the primary source (names plus stable author keys),
//! Google Books the secondary (names only, usually cleaner spelling).

use super::AuthorDimension;
use crate::normalize::{clean_author_name, match_key, validate_author_key};
use crate::similarity;
use crate::source::{GoogleBooksView, OpenLibraryView};
use tracing::debug;

/// Minimum similarity for two author names to be the same person
pub const AUTHOR_MATCH_THRESHOLD: f64 = 0.85;

/// Similarity of two names after case and punctuation are ignored
pub fn author_similarity(a: &str, b: &str) -> f64 {
    similarity::ratio(&match_key(a), &match_key(b))
}

/// Merge primary (keyed) and secondary (name-only) author lists
///
/// Either list being empty yields an empty result. Each primary author
/// takes the best unconsumed secondary name scoring at least
/// [`AUTHOR_MATCH_THRESHOLD`] (first seen wins ties) and keeps its own
/// key. Leftover secondary names are appended without a key unless they
/// are near-duplicates of an entry already merged.
pub fn merge_authors(primary: &[AuthorDimension], secondary: &[String]) -> Vec<AuthorDimension> {
    if primary.is_empty() || secondary.is_empty() {
        debug!(
            primary = primary.len(),
            secondary = secondary.len(),
            "Author list missing from one source; no authors merged"
        );
        return Vec::new();
    }

    let mut consumed = vec![false; secondary.len()];
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for author in primary {
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in secondary.iter().enumerate() {
            if consumed[idx] {
                continue;
            }
            let score = author_similarity(&author.name, candidate);
            if score >= AUTHOR_MATCH_THRESHOLD && best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) => {
                consumed[idx] = true;
                debug!(
                    primary = %author.name,
                    secondary = %secondary[idx],
                    score,
                    "Author names matched"
                );
                merged.push(AuthorDimension {
                    name: secondary[idx].clone(),
                    ol_author_key: author.ol_author_key.clone(),
                });
            }
            None => merged.push(author.clone()),
        }
    }

    for (idx, name) in secondary.iter().enumerate() {
        if consumed[idx] {
            continue;
        }
        let near_duplicate = merged
            .iter()
            .any(|existing| author_similarity(&existing.name, name) >= AUTHOR_MATCH_THRESHOLD);
        if near_duplicate {
            debug!(name = %name, "Skipping near-duplicate secondary author");
            continue;
        }
        merged.push(AuthorDimension {
            name: name.clone(),
            ol_author_key: None,
        });
    }

    merged
}

/// Open Library authors paired positionally with their keys
fn primary_authors(ol: &OpenLibraryView<'_>) -> Vec<AuthorDimension> {
    ol.authors()
        .into_iter()
        .filter_map(|(raw_name, raw_key)| {
            let name = clean_author_name(raw_name)?;
            let ol_author_key = validate_author_key(raw_key);
            Some(AuthorDimension { name, ol_author_key })
        })
        .collect()
}

fn secondary_authors(gb: &GoogleBooksView<'_>) -> Vec<String> {
    gb.authors()
        .into_iter()
        .filter_map(|raw| clean_author_name(Some(raw)))
        .collect()
}

pub fn reconcile_authors(gb: &GoogleBooksView<'_>, ol: &OpenLibraryView<'_>) -> Vec<AuthorDimension> {
    merge_authors(&primary_authors(ol), &secondary_authors(gb))
}
