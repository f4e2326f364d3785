//! The hash index: `key -> (score, attachment)`.
//!
//! Gives O(1) expected membership and point lookup. The façade is the
//! only thing that mutates this; it is always kept in lockstep with the
//! skip list so that "present in the hash index" and "present in the
//! skip list" are equivalent at every observable moment (invariant 1).

use std::collections::HashMap;
use std::hash::Hash;

pub(crate) struct Record<V> {
    pub(crate) score: f64,
    pub(crate) attachment: V,
}

pub(crate) struct HashIndex<K, V> {
    records: HashMap<K, Record<V>>,
}

impl<K: Eq + Hash, V> HashIndex<K, V> {
    pub(crate) fn new() -> Self {
        HashIndex {
            records: HashMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn get(&self, key: &K) -> Option<&Record<V>> {
        self.records.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut Record<V>> {
        self.records.get_mut(key)
    }

    pub(crate) fn insert(&mut self, key: K, record: Record<V>) {
        self.records.insert(key, record);
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<Record<V>> {
        self.records.remove(key)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }
}
