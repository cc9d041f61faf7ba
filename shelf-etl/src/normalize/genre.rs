//! Genre (category) cleaning

use super::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_GENRE_LENGTH: usize = 100;

/// "fiction / " style category path prefix
static CATEGORY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(fiction|non-fiction)\s*/\s*").expect("static genre pattern"));

/// Clean one genre; `None` when empty or longer than [`MAX_GENRE_LENGTH`]
pub fn clean_genre(raw: Option<&str>) -> Option<String> {
    let cleaned = collapse_whitespace(&raw?.to_lowercase());
    let cleaned = CATEGORY_PREFIX.replace(&cleaned, "");

    if cleaned.is_empty() || cleaned.chars().count() > MAX_GENRE_LENGTH {
        return None;
    }

    Some(cleaned.into_owned())
}
