
use fnv::FnvHashMap;
use std::{collections::hash_map::Entry, hash::Hash, iter::FromIterator};

/**
A multimap whose values for each key form a set.

Values are kept in insertion order, so iterating the values of a key is
deterministic.
*/
#[derive(Debug, Clone)]
pub struct FnvHashMultimap<K, V>(FnvHashMap<K, Vec<V>>);

impl<K, V> FnvHashMultimap<K, V> {
    pub fn new() -> Self {
        FnvHashMultimap(FnvHashMap::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        FnvHashMultimap(FnvHashMap::with_capacity_and_hasher(
            capacity,
            Default::default(),
        ))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> Default for FnvHashMultimap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: PartialEq> FnvHashMultimap<K, V> {
    pub fn contains_key<Key: ?Sized>(&self, key: &Key) -> bool
    where
        K: std::borrow::Borrow<Key>,
        Key: Eq + Hash,
    {
        self.0.contains_key(key)
    }

    pub fn contains<Key: ?Sized>(&self, key: &Key, value: &V) -> bool
    where
        K: std::borrow::Borrow<Key>,
        Key: Eq + Hash,
    {
        self.0
            .get(key)
            .map_or(false, |values| values.contains(value))
    }

    /// All the values associated with `key`, oldest first.
    pub fn get<Key: ?Sized>(&self, key: &Key) -> &[V]
    where
        K: std::borrow::Borrow<Key>,
        Key: Eq + Hash,
    {
        self.0.get(key).map_or(&[], |values| values.as_slice())
    }

    /// Returns `false` when the pair was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.0.entry(key) {
            Entry::Occupied(mut entry) => {
                if entry.get().contains(&value) {
                    false
                } else {
                    entry.get_mut().push(value);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(vec![value]);
                true
            }
        }
    }

    pub fn remove<Key: ?Sized>(&mut self, key: &Key, value: &V) -> bool
    where
        K: std::borrow::Borrow<Key>,
        Key: Eq + Hash,
    {
        if let Some(values) = self.0.get_mut(key) {
            let removed = match values.iter().position(|existing| existing == value) {
                None => false,
                Some(ix) => {
                    values.remove(ix);
                    true
                }
            };

            if values.is_empty() {
                self.0.remove(key);
            }

            removed
        } else {
            false
        }
    }

    pub fn remove_all<Key: ?Sized>(&mut self, key: &Key) -> Vec<V>
    where
        K: std::borrow::Borrow<Key>,
        Key: Eq + Hash,
    {
        self.0.remove(key).unwrap_or_default()
    }
}

impl<K: Eq + Hash, V: PartialEq> FromIterator<(K, V)> for FnvHashMultimap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut multimap = Self::new();
        for (key, value) in iter {
            multimap.insert(key, value);
        }
        multimap
    }
}

impl<K: Eq + Hash, V: PartialEq> Extend<(K, V)> for FnvHashMultimap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
