//! Addressable, priority-ordered containers for best-so-far tracking
//!
//! This crate provides two containers built for the hot inner loops of
//! search and optimization algorithms that keep a bounded set of
//! best-so-far candidates:
//!
//! - [`AddressableHeap`]: a binary min-heap over (priority, payload) pairs
//!   with a payload→slot reverse index, giving O(log n) removal of an
//!   arbitrary payload, O(1) membership checks, dual min/max peeks, and an
//!   optional capacity bound that retains only the top-K highest-priority
//!   entries seen so far.
//! - [`BoundedMap`]: a key→value map with the same top-K-by-value retention
//!   policy, delegating all ordering and eviction decisions to an internal
//!   [`AddressableHeap`].
//!
//! Neither container is thread-safe; callers needing concurrent access must
//! serialize externally.
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use indexed_heap::{AddressableHeap, Error};
//!
//! // Keep the three best-scoring candidates seen so far.
//! let mut best = AddressableHeap::with_capacity(NonZeroUsize::new(3).unwrap());
//! for (score, id) in [(0.4, 17u32), (0.9, 3), (0.1, 21), (0.7, 8), (0.5, 2)] {
//!     best.push(score, id)?;
//! }
//!
//! assert_eq!(best.len(), 3);
//! assert_eq!(best.peek()?, (&0.5, &2));   // worst of the kept three
//! assert_eq!(best.peek_max()?, (&0.9, &3));
//! # Ok::<(), Error>(())
//! ```

pub mod error;
pub mod heap;
pub mod map;

pub use error::Error;
pub use heap::{AddressableHeap, Pushed};
pub use map::{BoundedMap, SetOutcome};
