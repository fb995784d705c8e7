//! Set-difference between fetched and stored rows.

use std::collections::HashMap;
use std::hash::Hash;

/// Incoming rows that are new or differ from the stored row with the same
/// key. Equality covers every field, scores and flags included.
pub fn changed_rows<T, K, F>(incoming: &[T], stored: &[T], key: F) -> Vec<T>
where
    T: Clone + PartialEq,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let stored: HashMap<K, &T> = stored.iter().map(|row| (key(row), row)).collect();
    incoming
        .iter()
        .filter(|row| stored.get(&key(row)).map_or(true, |existing| *existing != *row))
        .cloned()
        .collect()
}
