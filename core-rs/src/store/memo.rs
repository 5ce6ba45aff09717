//! Generation-tagged memoization for `label` and `type_of` (spec.md §9
//! "Memoization"): every mutation bumps the store's generation counter, and
//! a cached value is only reused if it was computed under the generation
//! still current.

use std::collections::HashMap;

pub struct Memo<K, V> {
    entries: HashMap<K, (u64, V)>,
}

impl<K: std::hash::Hash + Eq, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get(&self, key: &K, generation: u64) -> Option<V> {
        self.entries.get(key).and_then(|(gen, value)| {
            if *gen == generation {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn insert(&mut self, key: K, generation: u64, value: V) {
        self.entries.insert(key, (generation, value));
    }
}

impl<K: std::hash::Hash + Eq, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
