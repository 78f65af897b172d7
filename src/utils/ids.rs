//! ID extraction from Maps API resource names and URLs.

use std::sync::LazyLock;

use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Resource collections whose IDs appear as `.../{kind}/{id}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum IdKind {
    Reviews,
    Photos,
    Places,
}

static REVIEWS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*reviews/([^/]*)/*.*").expect("reviews id pattern is valid"));
static PHOTOS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*photos/([^/]*)/*.*").expect("photos id pattern is valid"));
static PLACES_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*places/([^/]*)/*.*").expect("places id pattern is valid"));

impl IdKind {
    /// Path segment naming the collection.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Reviews => "reviews",
            IdKind::Photos => "photos",
            IdKind::Places => "places",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            IdKind::Reviews => &REVIEWS_ID,
            IdKind::Photos => &PHOTOS_ID,
            IdKind::Places => &PLACES_ID,
        }
    }
}

/// Extracts the ID that follows the last `"{kind}/"` in `s`.
///
/// Returns `None` when `s` mentions none of the known collections, when `kind`
/// does not occur, or when the segment after it is empty.
///
/// ```
/// use scrape_utils::utils::{extract_id, IdKind};
///
/// let name = "places/ChIJN1t_tDeuEmsRUsoyG83frY4/photos/AUc7tXW/media";
/// assert_eq!(extract_id(name, IdKind::Places).as_deref(), Some("ChIJN1t_tDeuEmsRUsoyG83frY4"));
/// assert_eq!(extract_id(name, IdKind::Photos).as_deref(), Some("AUc7tXW"));
/// assert_eq!(extract_id(name, IdKind::Reviews), None);
/// ```
pub fn extract_id(s: &str, kind: IdKind) -> Option<String> {
    if !IdKind::iter().any(|known| s.contains(known.as_str())) {
        return None;
    }

    kind.pattern()
        .captures(s)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
