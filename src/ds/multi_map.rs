//! Insertion-ordered multimap with predicate-filtered lookup.
//!
//! Maps each key to a bucket of values in insertion order. Lookups take a
//! predicate because callers filter on runtime attributes the map does not
//! track (reference state, pending IO); the first value in insertion order
//! that satisfies the predicate wins.
//!
//! ## Architecture
//!
//! ```text
//!   buckets: FxHashMap<K, Vec<V>>
//!   ┌───────────┬───────────────────┐
//!   │ key A     │ [v0, v1, v2]      │   find(A, pred) scans v0, v1, v2
//!   │ key B     │ [v3]              │   remove(A, &v1) closes the gap
//!   └───────────┴───────────────────┘
//!
//!   Empty buckets are dropped so count_for_key and len stay exact.
//! ```
//!
//! ## Operations
//! - `insert(k, v)`: appends to the key's bucket
//! - `remove(k, &v)`: removes one specific occurrence
//! - `find(k, pred)`: first value under `k` satisfying `pred`
//! - `count_for_key(k)` / `len`: exact counts

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug)]
/// Multimap from keys to insertion-ordered buckets of values.
pub struct MultiMap<K, V> {
    buckets: FxHashMap<K, Vec<V>>,
    len: usize,
}

impl<K, V> MultiMap<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
{
    /// Creates an empty multimap.
    pub fn new() -> Self {
        Self {
            buckets: FxHashMap::default(),
            len: 0,
        }
    }

    /// Appends `value` to the bucket for `key`.
    pub fn insert(&mut self, key: K, value: V) {
        self.buckets.entry(key).or_default().push(value);
        self.len += 1;
    }

    /// Removes one occurrence of `value` under `key`.
    ///
    /// Returns `true` if the pair was present. Later values under the same
    /// key keep their relative order.
    pub fn remove(&mut self, key: &K, value: &V) -> bool {
        let Some(bucket) = self.buckets.get_mut(key) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|v| v == value) else {
            return false;
        };
        bucket.remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(key);
        }
        self.len -= 1;
        true
    }

    /// Returns the first value under `key` satisfying `predicate`.
    pub fn find(&self, key: &K, mut predicate: impl FnMut(&V) -> bool) -> Option<&V> {
        self.buckets
            .get(key)?
            .iter()
            .find(|&value| predicate(value))
    }

    /// Returns the number of values stored under `key`.
    pub fn count_for_key(&self, key: &K) -> usize {
        self.buckets.get(key).map_or(0, Vec::len)
    }

    /// Returns the total number of stored values across all keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<K, V> Default for MultiMap<K, V>
where
    K: Eq + Hash + Clone,
    V: PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}
