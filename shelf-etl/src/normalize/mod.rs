//! Attribute normalizers
//!
//! Pure string-cleaning functions, one module per attribute family. None of
//! them fail: empty or unrecoverable input degrades to `None`.

pub mod author;
pub mod genre;
pub mod language;
pub mod publisher;
pub mod title;

pub use author::{clean_author_name, match_key, validate_author_key};
pub use genre::clean_genre;
pub use language::normalize_language_code;
pub use publisher::clean_publisher;
pub use title::clean_title;

/// Trim and collapse every whitespace run to a single space
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// True when the string has cased letters and they are all one case
///
/// Mixed-case input is treated as intentional and left alone by the
/// cleaners.
pub fn is_uniform_case(input: &str) -> bool {
    let mut cased = input.chars().filter(|c| is_cased(*c)).peekable();
    if cased.peek().is_none() {
        return false;
    }
    let cased: Vec<char> = cased.collect();
    cased.iter().all(|c| c.is_uppercase()) || cased.iter().all(|c| c.is_lowercase())
}

/// Word-initial capitals; a letter is word-initial when the previous
/// character is not a cased letter ("o'neil" becomes "O'Neil")
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_cased = false;

    for c in input.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = is_cased(c);
    }

    out
}

/// Title-case only uniformly cased input
pub fn smart_case(input: &str) -> String {
    if is_uniform_case(input) {
        title_case(input)
    } else {
        input.to_string()
    }
}
