//! Addressable binary min-heap with a payload reverse index
//!
//! [`AddressableHeap`] is a binary min-heap over (priority, payload) pairs
//! extended with a hash index from payload to its current slot, so that an
//! arbitrary payload can be removed in O(log n) instead of the usual
//! O(n) + O(log n) of scan-then-repair. Payloads are unique: pushing a payload
//! that is already stored is an error, which is what makes the reverse index
//! well defined.
//!
//! An optional capacity turns the heap into a top-K retainer: once full, a
//! push either evicts the current minimum (when the new priority beats it) or
//! is silently rejected, so the heap always holds the K highest-priority
//! entries seen so far.
//!
//! # Design
//!
//! Entries live in a dense `Vec` arena; the index maps payloads to positions
//! in that arena (using FxHash). Every swap performed by the sift operations
//! updates the index alongside the arena, and both sifts run all of their
//! comparisons before the first swap, so a failed comparison (for example a
//! `NaN` priority) leaves the heap untouched.
//!
//! # Example
//!
//! ```rust
//! use indexed_heap::{AddressableHeap, Error};
//!
//! let mut heap: AddressableHeap<f64, &str> = AddressableHeap::new();
//! heap.push(2.0, "b")?;
//! heap.push(1.0, "a")?;
//! heap.push(3.0, "c")?;
//!
//! assert_eq!(heap.peek()?, (&1.0, &"a"));
//! heap.remove(&"b")?;
//! assert_eq!(heap.pop()?, (1.0, "a"));
//! assert_eq!(heap.pop()?, (3.0, "c"));
//! # Ok::<(), Error>(())
//! ```

use std::cmp::Ordering;
use std::hash::Hash;
use std::mem;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::Error;

/// One occupied slot of the heap arena.
#[derive(Debug, Clone)]
struct Slot<P, T> {
    priority: P,
    payload: T,
}

/// Outcome of a successful [`AddressableHeap::push`].
///
/// A bounded heap that is full resolves a push by comparing the new priority
/// against the current minimum, so a push can succeed without storing the
/// payload (top-K retention). The variants carry the payload that did *not*
/// end up in the heap, replacing the removal callback of a C-style API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pushed<T> {
    /// The payload was inserted; nothing was displaced.
    Stored,
    /// The heap is at capacity and the new priority does not beat the
    /// current minimum. The payload is handed back and the heap is
    /// unchanged.
    Rejected(T),
    /// The heap was at capacity; the previous minimum was evicted to make
    /// room and is handed back.
    Evicted(T),
}

/// A binary min-heap with O(log n) removal of arbitrary payloads and an
/// optional top-K capacity bound.
///
/// Priorities only need `PartialOrd`; an incomparable pair surfaces as
/// [`Error::Unordered`] with the heap left unchanged. Payloads need
/// `Clone + Eq + Hash` for the reverse index.
///
/// Three read-side extras beyond the usual queue surface:
///
/// - [`peek_max`](Self::peek_max) returns the entry with the greatest
///   priority (scanning the leaf slots),
/// - [`last`](Self::last) returns the most recently inserted payload, for as
///   long as it is still stored,
/// - [`get`](Self::get) reads a slot by raw position.
#[derive(Debug, Clone)]
pub struct AddressableHeap<P, T> {
    /// Arena of entries; slot 0 is the heap root.
    slots: Vec<Slot<P, T>>,
    /// Payload -> slot position. Kept in lockstep with `slots` by every
    /// swap.
    index: FxHashMap<T, usize>,
    /// Maximum number of entries, or `None` for unbounded.
    capacity: Option<NonZeroUsize>,
    /// Most recently inserted payload, cleared when that payload leaves the
    /// heap by any path.
    last: Option<T>,
}

impl<P, T> Default for AddressableHeap<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, T> AddressableHeap<P, T> {
    /// Creates an empty heap with no capacity bound.
    pub fn new() -> Self {
        AddressableHeap {
            slots: Vec::new(),
            index: FxHashMap::default(),
            capacity: None,
            last: None,
        }
    }

    /// Creates an empty heap that retains at most `capacity` entries,
    /// keeping the ones with the greatest priorities.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        AddressableHeap {
            slots: Vec::new(),
            index: FxHashMap::default(),
            capacity: Some(capacity),
            last: None,
        }
    }

    /// Returns the number of entries currently stored.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the configured capacity bound, if any.
    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Visits the stored (priority, payload) pairs in arena order, which is
    /// not a sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&P, &T)> + '_ {
        self.slots.iter().map(|slot| (&slot.priority, &slot.payload))
    }

    /// Visits the stored payloads in arena order.
    pub fn payloads(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().map(|slot| &slot.payload)
    }

    /// Reads the payload at raw slot position `i`.
    ///
    /// The only guarantee about the slot order is that position 0 is the
    /// minimum.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `i >= len()`.
    pub fn get(&self, i: usize) -> Result<&T, Error> {
        self.slots.get(i).map(|slot| &slot.payload).ok_or(Error::OutOfRange)
    }

    /// Removes every entry. The capacity bound is retained. A no-op on an
    /// already-empty heap.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.last = None;
    }
}

impl<P, T> AddressableHeap<P, T>
where
    P: PartialOrd,
    T: Clone + Eq + Hash,
{
    /// Returns true if `payload` is currently stored. O(1).
    pub fn contains(&self, payload: &T) -> bool {
        self.index.contains_key(payload)
    }

    /// Returns the minimum entry without removing it.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the heap holds no entries.
    pub fn peek(&self) -> Result<(&P, &T), Error> {
        self.slots
            .first()
            .map(|slot| (&slot.priority, &slot.payload))
            .ok_or(Error::Empty)
    }

    /// Returns the entry with the greatest priority without removing it.
    ///
    /// In a min-heap the maximum is always stored in a leaf, so this scans
    /// the leaf half of the arena.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the heap holds no entries, [`Error::Unordered`]
    /// when two stored priorities cannot be compared.
    pub fn peek_max(&self) -> Result<(&P, &T), Error> {
        if self.slots.is_empty() {
            return Err(Error::Empty);
        }

        let mut best = self.slots.len() / 2;
        for i in best + 1..self.slots.len() {
            if lt(&self.slots[best].priority, &self.slots[i].priority)? {
                best = i;
            }
        }

        let slot = &self.slots[best];
        Ok((&slot.priority, &slot.payload))
    }

    /// Returns the most recently inserted payload, or `Ok(None)` if that
    /// payload has since been removed by any operation (pop, remove,
    /// replace, pushpop eviction or clear).
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the heap holds no entries at all; the "tracked
    /// payload is gone" case is `Ok(None)`, not an error.
    pub fn last(&self) -> Result<Option<&T>, Error> {
        if self.slots.is_empty() {
            return Err(Error::Empty);
        }
        Ok(self.last.as_ref())
    }

    /// Inserts `payload` with the given priority.
    ///
    /// On a bounded heap that is full, the push turns into a comparison with
    /// the current minimum: a priority that does not exceed it leaves the
    /// heap unchanged and hands the payload back as
    /// [`Pushed::Rejected`]; a greater priority evicts the minimum
    /// ([`Pushed::Evicted`]) before inserting.
    ///
    /// On success the inserted payload becomes the [`last`](Self::last)
    /// payload.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyPresent`] when `payload` is stored (checked first,
    /// before any capacity logic); [`Error::Unordered`] on an incomparable
    /// priority, with the heap left unchanged.
    pub fn push(&mut self, priority: P, payload: T) -> Result<Pushed<T>, Error> {
        if self.index.contains_key(&payload) {
            return Err(Error::AlreadyPresent);
        }

        if let Some(capacity) = self.capacity {
            if self.slots.len() >= capacity.get() {
                // Top-K retention: only a priority beating the current
                // minimum may enter a full heap.
                if !lt(&self.slots[0].priority, &priority)? {
                    return Ok(Pushed::Rejected(payload));
                }
                let (_, evicted) = self.replace_root(priority, payload)?;
                return Ok(Pushed::Evicted(evicted));
            }
        }

        let pos = self.slots.len();
        self.index.insert(payload.clone(), pos);
        self.slots.push(Slot { priority, payload });

        match self.sift_up(pos) {
            Ok(target) => {
                self.last = Some(self.slots[target].payload.clone());
                Ok(Pushed::Stored)
            }
            Err(err) => {
                // The sift did not move anything, so undoing the append
                // restores the previous state exactly.
                let slot = self.slots.pop().ok_or(Error::Empty)?;
                self.index.remove(&slot.payload);
                Err(err)
            }
        }
    }

    /// Removes and returns the minimum entry.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the heap holds no entries, [`Error::Unordered`]
    /// on an incomparable priority (heap unchanged).
    pub fn pop(&mut self) -> Result<(P, T), Error> {
        if self.slots.is_empty() {
            return Err(Error::Empty);
        }

        let root = if self.slots.len() == 1 {
            let slot = self.slots.pop().ok_or(Error::Empty)?;
            self.index.remove(&slot.payload);
            slot
        } else {
            let filler = self.slots.pop().ok_or(Error::Empty)?;
            let tail = self.slots.len();
            self.index.insert(filler.payload.clone(), 0);
            let root = mem::replace(&mut self.slots[0], filler);
            self.index.remove(&root.payload);

            if let Err(err) = self.sift_down(0) {
                // Put both entries back where they came from.
                let filler = mem::replace(&mut self.slots[0], root);
                self.index.insert(self.slots[0].payload.clone(), 0);
                self.index.insert(filler.payload.clone(), tail);
                self.slots.push(filler);
                return Err(err);
            }
            root
        };

        self.forget(&root.payload);
        Ok((root.priority, root.payload))
    }

    /// Removes an arbitrary payload, restoring heap order around the slot it
    /// occupied. O(log n).
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `payload` is not stored (including on an
    /// empty heap), [`Error::Unordered`] on an incomparable priority (heap
    /// unchanged).
    pub fn remove(&mut self, payload: &T) -> Result<(P, T), Error> {
        let pos = *self.index.get(payload).ok_or(Error::NotFound)?;
        let tail = self.slots.len() - 1;

        let removed = if pos == tail {
            let slot = self.slots.pop().ok_or(Error::NotFound)?;
            self.index.remove(&slot.payload);
            slot
        } else {
            let filler = self.slots.pop().ok_or(Error::NotFound)?;
            self.index.insert(filler.payload.clone(), pos);
            let removed = mem::replace(&mut self.slots[pos], filler);
            self.index.remove(&removed.payload);

            if let Err(err) = self.repair(pos) {
                let filler = mem::replace(&mut self.slots[pos], removed);
                self.index.insert(self.slots[pos].payload.clone(), pos);
                self.index.insert(filler.payload.clone(), tail);
                self.slots.push(filler);
                return Err(err);
            }
            removed
        };

        self.forget(&removed.payload);
        Ok((removed.priority, removed.payload))
    }

    /// Changes the priority of a stored payload, restoring heap order
    /// around its slot. O(log n).
    ///
    /// Returns the previous priority. The [`last`](Self::last) marker is
    /// not affected: the payload never leaves the heap.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `payload` is not stored,
    /// [`Error::Unordered`] on an incomparable priority (heap unchanged,
    /// the old priority kept).
    pub fn update(&mut self, priority: P, payload: &T) -> Result<P, Error> {
        let pos = *self.index.get(payload).ok_or(Error::NotFound)?;
        let old = mem::replace(&mut self.slots[pos].priority, priority);

        if let Err(err) = self.repair(pos) {
            // The repair sifts run all comparisons before the first swap,
            // so putting the old priority back restores the exact state.
            self.slots[pos].priority = old;
            return Err(err);
        }
        Ok(old)
    }

    /// Pops the current minimum and inserts the new entry in its place,
    /// ignoring the capacity bound (the length does not change). The new
    /// payload becomes the [`last`](Self::last) payload.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the heap holds no entries,
    /// [`Error::AlreadyPresent`] when `payload` is stored,
    /// [`Error::Unordered`] on an incomparable priority (heap unchanged).
    pub fn replace(&mut self, priority: P, payload: T) -> Result<(P, T), Error> {
        if self.slots.is_empty() {
            return Err(Error::Empty);
        }
        if self.index.contains_key(&payload) {
            return Err(Error::AlreadyPresent);
        }
        self.replace_root(priority, payload)
    }

    /// A push immediately followed by a pop, in one sift.
    ///
    /// When the heap is empty, or the new priority does not exceed the
    /// current minimum, the entry never enters the heap and is returned
    /// directly (and the [`last`](Self::last) payload is not updated).
    /// Otherwise the previous minimum is popped and returned, and the new
    /// entry takes its place.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyPresent`] when `payload` is stored,
    /// [`Error::Unordered`] on an incomparable priority (heap unchanged).
    pub fn pushpop(&mut self, priority: P, payload: T) -> Result<(P, T), Error> {
        if self.index.contains_key(&payload) {
            return Err(Error::AlreadyPresent);
        }
        if self.slots.is_empty() || !lt(&self.slots[0].priority, &priority)? {
            return Ok((priority, payload));
        }
        self.replace_root(priority, payload)
    }

    /// Changes the capacity bound, shrinking by repeated pops of the minimum
    /// while the heap is over the new bound.
    ///
    /// # Errors
    ///
    /// [`Error::Unordered`] when a shrinking pop hits an incomparable
    /// priority; entries popped before the failure stay removed.
    pub fn set_capacity(&mut self, capacity: Option<NonZeroUsize>) -> Result<(), Error> {
        if let Some(bound) = capacity {
            while self.slots.len() > bound.get() {
                self.pop()?;
            }
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Swaps the new entry into the root slot and sifts it down, returning
    /// the displaced root. Callers guarantee the heap is non-empty and the
    /// payload absent.
    fn replace_root(&mut self, priority: P, payload: T) -> Result<(P, T), Error> {
        let inserted = payload.clone();
        self.index.insert(payload.clone(), 0);
        let old = mem::replace(&mut self.slots[0], Slot { priority, payload });
        self.index.remove(&old.payload);

        if let Err(err) = self.sift_down(0) {
            let fresh = mem::replace(&mut self.slots[0], old);
            self.index.remove(&fresh.payload);
            self.index.insert(self.slots[0].payload.clone(), 0);
            return Err(err);
        }

        self.forget(&old.payload);
        self.last = Some(inserted);
        Ok((old.priority, old.payload))
    }

    /// Restores heap order at `pos` after its entry was overwritten: try to
    /// move it toward the root, and only if it stays put, toward the leaves.
    fn repair(&mut self, pos: usize) -> Result<(), Error> {
        if self.sift_up(pos)? == pos {
            self.sift_down(pos)?;
        }
        Ok(())
    }

    /// Moves the entry at `pos` toward the root until its parent is no
    /// longer greater, returning its final position.
    ///
    /// Runs every comparison before the first swap: an `Err` means nothing
    /// moved.
    fn sift_up(&mut self, pos: usize) -> Result<usize, Error> {
        let mut target = pos;
        while target > 0 {
            let parent = (target - 1) / 2;
            if lt(&self.slots[pos].priority, &self.slots[parent].priority)? {
                target = parent;
            } else {
                break;
            }
        }

        let mut cur = pos;
        while cur > target {
            let parent = (cur - 1) / 2;
            self.slots.swap(cur, parent);
            let displaced = self.slots[cur].payload.clone();
            self.index.insert(displaced, cur);
            cur = parent;
        }
        if target != pos {
            let moved = self.slots[target].payload.clone();
            self.index.insert(moved, target);
        }
        Ok(target)
    }

    /// Moves the entry at `pos` toward the leaves, swapping with the smaller
    /// child while heap order is violated, returning its final position.
    ///
    /// Runs every comparison before the first swap: an `Err` means nothing
    /// moved.
    fn sift_down(&mut self, pos: usize) -> Result<usize, Error> {
        let len = self.slots.len();
        let mut path: SmallVec<[usize; 16]> = SmallVec::new();
        let mut cur = pos;
        loop {
            let left = 2 * cur + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len
                && lt(&self.slots[right].priority, &self.slots[left].priority)?
            {
                right
            } else {
                left
            };
            if lt(&self.slots[child].priority, &self.slots[pos].priority)? {
                path.push(child);
                cur = child;
            } else {
                break;
            }
        }

        let mut at = pos;
        for &child in &path {
            self.slots.swap(at, child);
            let displaced = self.slots[at].payload.clone();
            self.index.insert(displaced, at);
            at = child;
        }
        if at != pos {
            let moved = self.slots[at].payload.clone();
            self.index.insert(moved, at);
        }
        Ok(at)
    }

    /// Drops the last-inserted marker if it refers to the removed payload.
    fn forget(&mut self, payload: &T) {
        if self.last.as_ref() == Some(payload) {
            self.last = None;
        }
    }
}

/// Strict less-than through `PartialOrd`, surfacing incomparable pairs as
/// [`Error::Unordered`].
fn lt<P: PartialOrd>(a: &P, b: &P) -> Result<bool, Error> {
    match a.partial_cmp(b) {
        Some(Ordering::Less) => Ok(true),
        Some(_) => Ok(false),
        None => Err(Error::Unordered),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut heap = AddressableHeap::new();

        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.push(3, "three").unwrap();
        heap.push(1, "one").unwrap();
        heap.push(2, "two").unwrap();

        assert!(!heap.is_empty());
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek().unwrap(), (&1, &"one"));

        assert_eq!(heap.pop().unwrap(), (1, "one"));
        assert_eq!(heap.pop().unwrap(), (2, "two"));
        assert_eq!(heap.pop().unwrap(), (3, "three"));
        assert_eq!(heap.pop(), Err(Error::Empty));
    }

    #[test]
    fn test_ascending_insertion() {
        let mut heap = AddressableHeap::new();

        for i in 0..100 {
            heap.push(i, i).unwrap();
        }
        for i in 0..100 {
            assert_eq!(heap.pop().unwrap(), (i, i));
        }
    }

    #[test]
    fn test_descending_insertion() {
        let mut heap = AddressableHeap::new();

        for i in (0..100).rev() {
            heap.push(i, i).unwrap();
        }
        for i in 0..100 {
            assert_eq!(heap.pop().unwrap(), (i, i));
        }
    }

    #[test]
    fn test_remove_interior() {
        let mut heap = AddressableHeap::new();

        for i in 0..50 {
            heap.push(i, i).unwrap();
        }
        for i in (0..50).step_by(2) {
            heap.remove(&i).unwrap();
        }

        assert_eq!(heap.len(), 25);
        for i in (1..50).step_by(2) {
            assert_eq!(heap.pop().unwrap(), (i, i));
        }
    }

    #[test]
    fn test_index_follows_swaps() {
        let mut heap = AddressableHeap::new();

        for i in [7, 3, 9, 1, 8, 2, 6, 4, 5, 0] {
            heap.push(i, i).unwrap();
        }
        // Every payload must be reachable through the index after the
        // sift-heavy build.
        for i in 0..10 {
            assert!(heap.contains(&i));
            let (p, _) = heap.remove(&i).unwrap();
            assert_eq!(p, i);
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_capacity_evicts_minimum() {
        let mut heap = AddressableHeap::with_capacity(NonZeroUsize::new(3).unwrap());

        heap.push(1, "a").unwrap();
        heap.push(2, "b").unwrap();
        heap.push(3, "c").unwrap();

        assert_eq!(heap.push(4, "d").unwrap(), Pushed::Evicted("a"));
        assert_eq!(heap.push(0, "e").unwrap(), Pushed::Rejected("e"));
        assert_eq!(heap.len(), 3);

        assert_eq!(heap.pop().unwrap(), (2, "b"));
        assert_eq!(heap.pop().unwrap(), (3, "c"));
        assert_eq!(heap.pop().unwrap(), (4, "d"));
    }

    #[test]
    fn test_update_reorders() {
        let mut heap = AddressableHeap::new();

        for i in 0..10 {
            heap.push(i, i).unwrap();
        }

        assert_eq!(heap.update(15, &0).unwrap(), 0);
        assert_eq!(heap.peek().unwrap(), (&1, &1));

        assert_eq!(heap.update(-1, &7).unwrap(), 7);
        assert_eq!(heap.peek().unwrap(), (&-1, &7));

        // The payload never left the heap, so the marker is untouched.
        assert_eq!(heap.last().unwrap(), Some(&9));

        assert_eq!(heap.update(0, &42), Err(Error::NotFound));
        assert_eq!(heap.len(), 10);
    }

    #[test]
    fn test_update_unordered_is_atomic() {
        let mut heap = AddressableHeap::new();

        heap.push(1.0, "a").unwrap();
        heap.push(2.0, "b").unwrap();
        heap.push(3.0, "c").unwrap();

        assert_eq!(heap.update(f64::NAN, &"a"), Err(Error::Unordered));
        assert_eq!(heap.peek().unwrap(), (&1.0, &"a"));
        assert_eq!(heap.pop().unwrap(), (1.0, "a"));
        assert_eq!(heap.pop().unwrap(), (2.0, "b"));
    }

    #[test]
    fn test_nan_priority_is_rejected_atomically() {
        let mut heap = AddressableHeap::new();

        heap.push(1.0, "a").unwrap();
        heap.push(2.0, "b").unwrap();

        assert_eq!(heap.push(f64::NAN, "n"), Err(Error::Unordered));
        assert_eq!(heap.len(), 2);
        assert!(!heap.contains(&"n"));
        assert_eq!(heap.peek().unwrap(), (&1.0, &"a"));
    }

    #[test]
    fn test_set_capacity_shrinks() {
        let mut heap = AddressableHeap::new();

        for i in 0..10 {
            heap.push(i, i).unwrap();
        }
        heap.set_capacity(NonZeroUsize::new(4)).unwrap();

        assert_eq!(heap.len(), 4);
        assert_eq!(heap.peek().unwrap(), (&6, &6));
    }
}
