//! URL slugs for place and category names.

use deunicode::deunicode;

/// Turns a display name into a URL slug.
///
/// The name is lowercased and transliterated to ASCII; every run of
/// characters that are not ASCII letters or digits becomes a single `-`, and
/// leading/trailing dashes are dropped. Empty or whitespace-only input yields
/// an empty string.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(&name.to_lowercase()).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Turns a slug back into space-separated words.
///
/// Splits on the separators a slug may contain (`-`, `_`, `.`, `~`) and joins
/// the non-empty pieces with a single space. Case is preserved.
pub fn deslugify(slug: &str) -> String {
    slug.trim()
        .split(['-', '_', '.', '~'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
