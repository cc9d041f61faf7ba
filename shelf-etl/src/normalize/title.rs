//! Title cleaning

use super::{collapse_whitespace, smart_case};
use once_cell::sync::Lazy;
use regex::Regex;

/// Edition/format suffixes that differ between sources, applied in order
static EDITION_SUFFIXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s*[\(\[]?(Hardcover|Paperback|Kindle|E-?book|Audio)[\)\]]?\s*$",
        r"(?i)\s*[\(\[]?(First|Second|Third|\d+(?:st|nd|rd|th)) Edition[\)\]]?\s*$",
        r"(?i)\s*[\(\[](Revised|Annotated|Illustrated|Unabridged)[\)\]]\s*$",
        r"(?i)\s*-\s*(Revised|Annotated|Illustrated)\s*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static title pattern"))
    .collect()
});

const EDGE_PUNCTUATION: &[char] = &['.', ',', ';', ':', '-', '_'];

/// Clean one title; `None` when nothing survives
pub fn clean_title(raw: Option<&str>) -> Option<String> {
    let mut cleaned = collapse_whitespace(raw?);
    if cleaned.is_empty() {
        return None;
    }

    for pattern in EDITION_SUFFIXES.iter() {
        cleaned = pattern.replace(&cleaned, "").trim().to_string();
    }

    let cleaned = collapse_whitespace(&smart_case(&cleaned));
    let cleaned = cleaned.trim_matches(|c: char| EDGE_PUNCTUATION.contains(&c) || c.is_whitespace());

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
