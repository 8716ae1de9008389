//! Identity-based merging of pages into an accumulated collection.

use std::collections::HashSet;

/// Anything with a stable string identity.
///
/// `None` marks an entry that cannot be merged (missing or empty id).
pub trait Keyed {
    fn key(&self) -> Option<&str>;
}

/// Concatenates `existing` and `incoming`, keeping only the first occurrence
/// of each key.
///
/// Entries without a key are dropped. Merging the same page twice is a no-op
/// and relative order of first appearance is preserved.
pub fn merge<T: Keyed + Clone>(existing: &[T], incoming: &[T]) -> Vec<T> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming)
        .filter(|item| item.key().is_some_and(|key| seen.insert(key)))
        .cloned()
        .collect()
}
