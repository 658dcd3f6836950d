//! Position index for deduplicating materialized roots.
//!
//! Roots are kept in first-seen order in a plain `Vec`; the index maps each
//! identity key to the root's position so a repeated key can be found
//! without scanning the list.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug)]
pub struct KeyIndex<K: Eq + Hash> {
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash> KeyIndex<K> {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Position recorded for `key`, if it was seen before.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    /// Records the position of a new key.
    ///
    /// Returns false and keeps the first position if the key was already present.
    pub fn insert(&mut self, key: K, position: usize) -> bool {
        match self.positions.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(position);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<K: Eq + Hash> Default for KeyIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}
