//! Author name cleaning and author-key validation

use super::{collapse_whitespace, smart_case};
use once_cell::sync::Lazy;
use regex::Regex;

/// Open Library author id: "OL" + digits + optional trailing letter
static AUTHOR_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^OL\d+[A-Z]?$").expect("static author key pattern"));

const AUTHOR_KEY_PREFIX: &str = "/authors/";

/// Quote artifacts left by scraping or CSV escaping
const QUOTE_ARTIFACTS: &[char] = &['"', '\'', '`', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}'];

/// Clean one author name; `None` when nothing survives
pub fn clean_author_name(raw: Option<&str>) -> Option<String> {
    let cleaned = collapse_whitespace(raw?);
    let cleaned = cleaned.trim_matches(|c: char| {
        QUOTE_ARTIFACTS.contains(&c) || c == ',' || c == ';' || c.is_whitespace()
    });
    // Doubled quotes inside a name ("J.K. ""Jo"" Rowling")
    let cleaned = cleaned.replace("\"\"", "\"");

    if cleaned.is_empty() {
        return None;
    }

    Some(smart_case(&cleaned))
}

/// Validated author key with any "/authors/" prefix removed
///
/// An invalid key is dropped; the author itself is kept by the caller.
pub fn validate_author_key(raw: Option<&str>) -> Option<String> {
    let key = raw?.trim();
    let key = key.strip_prefix(AUTHOR_KEY_PREFIX).unwrap_or(key);

    if AUTHOR_KEY.is_match(key) {
        Some(key.to_string())
    } else {
        None
    }
}

/// Comparison form of a name: lower-cased, punctuation turned into
/// spaces, whitespace collapsed
pub fn match_key(name: &str) -> String {
    let spaced: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&spaced)
}
