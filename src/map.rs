//! Capacity-bounded key/value map ordered by value
//!
//! [`BoundedMap`] is a hash map that retains only the entries with the
//! greatest values once a capacity bound is reached. Ordering and eviction
//! are delegated to an internal [`AddressableHeap`] keyed by value (value as
//! priority, key as payload); the map keeps its own key→value table for O(1)
//! reads and keeps both structures in lockstep on every mutation.
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use indexed_heap::{BoundedMap, Error, SetOutcome};
//!
//! let mut best: BoundedMap<&str, i32> = BoundedMap::with_capacity(
//!     NonZeroUsize::new(2).unwrap(),
//! );
//! best.set("foo", 3)?;
//! best.set("bar", 2)?;
//! assert_eq!(best.set("baz", 4)?, SetOutcome::Evicted("bar", 2));
//! assert_eq!(best.set("barbaz", 1)?, SetOutcome::Rejected(1));
//!
//! assert_eq!(best.len(), 2);
//! assert_eq!(best.get(&"foo"), Some(&3));
//! assert_eq!(best.get(&"barbaz"), None);
//! # Ok::<(), Error>(())
//! ```

use std::hash::Hash;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::heap::{AddressableHeap, Pushed};

/// Outcome of a successful [`BoundedMap::set`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome<K, V> {
    /// The key was new and was inserted; nothing was displaced.
    Stored,
    /// The key was already present; its previous value is handed back.
    Replaced(V),
    /// The map is at capacity and the value does not beat the smallest
    /// stored value. The map is unchanged and the key stays absent; the
    /// value is handed back.
    Rejected(V),
    /// The map was at capacity; the entry with the smallest value was
    /// evicted to make room and is handed back.
    Evicted(K, V),
}

/// A key/value map with top-K-by-value retention.
///
/// Keys need `Clone + Eq + Hash`; values need `Clone + PartialOrd` because
/// they drive the eviction order. Setting a value that cannot be compared
/// against the stored ones fails with [`Error::Unordered`] and leaves the
/// map untouched.
#[derive(Debug, Clone)]
pub struct BoundedMap<K, V> {
    /// Direct key -> value lookup table.
    entries: FxHashMap<K, V>,
    /// Eviction order: value as priority, key as payload. Holds exactly the
    /// keys of `entries`.
    order: AddressableHeap<V, K>,
}

impl<K, V> Default for BoundedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BoundedMap<K, V> {
    /// Creates an empty map with no capacity bound.
    pub fn new() -> Self {
        BoundedMap {
            entries: FxHashMap::default(),
            order: AddressableHeap::new(),
        }
    }

    /// Creates an empty map that retains at most `capacity` entries,
    /// keeping the ones with the greatest values.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        BoundedMap {
            entries: FxHashMap::default(),
            order: AddressableHeap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configured capacity bound, if any.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.order.capacity()
    }

    /// Visits the stored entries in an unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter()
    }

    /// Visits the stored keys in an unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    /// Visits the stored values in an unspecified order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.values()
    }

    /// Removes every entry. The capacity bound is retained. A no-op on an
    /// already-empty map.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl<K, V> BoundedMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone + PartialOrd,
{
    /// Reads the value stored under `key`, or `None` when absent. Never
    /// fails.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Reads the value stored under `key`, failing when absent.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when the key is not present.
    pub fn fetch(&self, key: &K) -> Result<&V, Error> {
        self.entries.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns true if `key` is currently stored. O(1).
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the key holding the greatest stored value.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the map holds no entries, [`Error::Unordered`]
    /// when two stored values cannot be compared.
    pub fn max_key(&self) -> Result<&K, Error> {
        self.order.peek_max().map(|(_, key)| key)
    }

    /// Stores `value` under `key`, applying the same top-K retention as the
    /// ordering heap.
    ///
    /// An existing key is updated in place by reprioritizing its ordering
    /// entry, so an update always fits within the capacity bound. A new key
    /// on a full map either evicts the entry with the smallest value or,
    /// when `value` does not beat it, is rejected without touching the map.
    ///
    /// # Errors
    ///
    /// [`Error::Unordered`] when `value` cannot be compared against a
    /// stored value; the map is left as it was.
    pub fn set(&mut self, key: K, value: V) -> Result<SetOutcome<K, V>, Error> {
        if self.entries.contains_key(&key) {
            self.order.update(value.clone(), &key)?;
            let old_value = self
                .entries
                .insert(key, value)
                .expect("key checked present above");
            return Ok(SetOutcome::Replaced(old_value));
        }

        match self.order.push(value.clone(), key.clone())? {
            Pushed::Stored => {
                self.entries.insert(key, value);
                Ok(SetOutcome::Stored)
            }
            Pushed::Rejected(_) => Ok(SetOutcome::Rejected(value)),
            Pushed::Evicted(evicted_key) => {
                let evicted_value = self
                    .entries
                    .remove(&evicted_key)
                    .expect("map entries and ordering heap out of sync");
                self.entries.insert(key, value);
                Ok(SetOutcome::Evicted(evicted_key, evicted_value))
            }
        }
    }

    /// Removes the entry stored under `key` from both the table and the
    /// ordering heap, returning its value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when the key is not present,
    /// [`Error::Unordered`] when repairing the heap hits an incomparable
    /// pair of stored values. The map is unchanged on any error.
    pub fn delete(&mut self, key: &K) -> Result<V, Error> {
        if !self.entries.contains_key(key) {
            return Err(Error::KeyNotFound);
        }
        // The heap repair runs first: it can fail on an incomparable pair,
        // and the table must not change in that case.
        match self.order.remove(key) {
            Ok(_) => {}
            Err(Error::Unordered) => return Err(Error::Unordered),
            Err(_) => panic!("map entries and ordering heap out of sync"),
        }
        let value = self
            .entries
            .remove(key)
            .expect("key checked present above");
        Ok(value)
    }

    /// Changes the capacity bound, evicting the entries with the smallest
    /// values while the map is over the new bound.
    ///
    /// # Errors
    ///
    /// [`Error::Unordered`] when an eviction hits incomparable values;
    /// entries evicted before the failure stay removed.
    pub fn set_capacity(&mut self, capacity: Option<NonZeroUsize>) -> Result<(), Error> {
        if let Some(bound) = capacity {
            while self.order.len() > bound.get() {
                let (_, key) = self.order.pop()?;
                self.entries
                    .remove(&key)
                    .expect("map entries and ordering heap out of sync");
            }
        }
        self.order.set_capacity(capacity)
    }
}
