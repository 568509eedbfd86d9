//! Error type shared by [`AddressableHeap`](crate::AddressableHeap) and
//! [`BoundedMap`](crate::BoundedMap).
//!
//! Every failure is reported synchronously and is recoverable; a returned
//! `Err` means the operation had no effect on the container (see the
//! atomicity notes on the individual operations).

use thiserror::Error;

/// Error returned by container operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The heap has no elements, so there is nothing to peek at or remove.
    #[error("the heap is empty")]
    Empty,

    /// The payload passed to a removal operation is not stored in the heap.
    #[error("the given item was not found in the heap")]
    NotFound,

    /// The payload passed to an insertion operation is already stored.
    /// Payload uniqueness is a structural invariant of the heap.
    #[error("the given item is already present in the heap")]
    AlreadyPresent,

    /// The key passed to a direct map read or delete is not present.
    #[error("the given key is not present")]
    KeyNotFound,

    /// The slot index passed to a positional read is outside `0..len`.
    #[error("index out of range")]
    OutOfRange,

    /// Two priorities (or map values) could not be ordered, e.g. a `NaN`
    /// was involved. The container is left exactly as it was before the
    /// failing call.
    #[error("the priorities cannot be totally ordered")]
    Unordered,
}
