//! Small string helpers.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::config::RANDOM_STRING_CHARSET;

static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").expect("camel case boundary pattern is valid"));

/// Shortens `text` to at most `max_chars` characters.
///
/// With `ellipsis`, the last three of those characters are `...`. Text that
/// already fits is returned unchanged. Counts `char`s, not bytes.
pub fn truncate(text: &str, max_chars: usize, ellipsis: bool) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let suffix = if ellipsis { "..." } else { "" };
    let keep = max_chars.saturating_sub(suffix.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(suffix);
    truncated
}

/// Converts `camelCase` / `PascalCase` identifiers to `snake_case`.
///
/// An underscore is inserted between a lowercase ASCII letter and the
/// uppercase letter that follows it; acronyms are not split.
pub fn camel_to_snake_case(s: &str) -> String {
    CAMEL_BOUNDARY.replace_all(s, "${1}_${2}").to_lowercase()
}

/// Generates a random string of `length` characters from `[A-Za-z0-9_]`.
pub fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..RANDOM_STRING_CHARSET.len());
            char::from(RANDOM_STRING_CHARSET[idx])
        })
        .collect()
}
