//! Publisher name cleaning

use super::{collapse_whitespace, smart_case};
use once_cell::sync::Lazy;
use regex::Regex;

/// Legal-entity suffix spellings and their canonical form
static LEGAL_SUFFIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bLTD\.?\b", "Ltd"),
        (r"(?i)\bINC\.?\b", "Inc"),
        (r"(?i)\bLLC\.?\b", "LLC"),
        (r"(?i)\bCO\.?\b", "Co"),
        (r"(?i)\bCORPORATION\b", "Corporation"),
        (r"(?i)\bLIMITED\b", "Limited"),
    ]
    .iter()
    .map(|(pattern, canonical)| (Regex::new(pattern).expect("static suffix pattern"), *canonical))
    .collect()
});

static TRAILING_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,;:\s]+$").expect("static punctuation pattern"));

/// Bare region code at the very end ("Penguin UK", "Scholastic U.S")
static TRAILING_REGION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(U\.?S\.?|UK|EU|CA|AU)\b$").expect("static region pattern"));

/// Clean one publisher name; `None` when nothing survives
pub fn clean_publisher(raw: Option<&str>) -> Option<String> {
    let cleaned = collapse_whitespace(raw?);
    if cleaned.is_empty() {
        return None;
    }

    let mut cleaned = smart_case(&cleaned);

    for (pattern, canonical) in LEGAL_SUFFIXES.iter() {
        cleaned = pattern.replace_all(&cleaned, *canonical).into_owned();
    }

    let cleaned = TRAILING_PUNCTUATION.replace(&cleaned, "");
    let cleaned = TRAILING_REGION.replace(cleaned.trim(), "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
