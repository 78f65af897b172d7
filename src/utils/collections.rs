//! Collection helpers for scraped records.

use std::collections::HashSet;
use std::hash::Hash;

use serde_json::Value;

/// Removes items whose key was already seen, keeping the first occurrence.
pub fn dedupe_by_key<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Compares two JSON records while ignoring one property.
///
/// Both must have the same set of keys (apart from `excluded`) with equal
/// values. Non-object values are compared directly.
pub fn equal_excluding(a: &Value, b: &Value, excluded: &str) -> bool {
    match (a.as_object(), b.as_object()) {
        (Some(left), Some(right)) => {
            let left_matches = left
                .iter()
                .filter(|(key, _)| key.as_str() != excluded)
                .all(|(key, value)| right.get(key) == Some(value));
            let right_covered = right
                .keys()
                .filter(|key| key.as_str() != excluded)
                .all(|key| left.contains_key(key));
            left_matches && right_covered
        }
        _ => a == b,
    }
}
