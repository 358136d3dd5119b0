//! Error types for the pool, list and queue layers.
//!
//! "No item" is never an error in this crate: accessors return `Option`.
//! The types here describe operations that *failed*, so callers can tell
//! "the list is empty" apart from "the insert did not happen".

use thiserror::Error;

/// The pool could not hand out another slot.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("node pool exhausted ({capacity} nodes in use)")]
    NodesExhausted { capacity: usize },
    #[error("list pool exhausted ({capacity} lists in use)")]
    ListsExhausted { capacity: usize },
}

/// A list mutation was refused. The list is left exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    #[error("no resource: {0}")]
    NoResource(#[from] PoolError),
}

/// An enqueue was refused.
///
/// `Closed` and `Full` hand the item back; an item refused for lack of
/// storage has already been dropped.
#[derive(Error, Debug)]
pub enum QueueError<T> {
    /// The queue was closed; nothing more will be accepted.
    #[error("queue is closed")]
    Closed(T),
    /// The capacity bound is reached (only from `try_enqueue`).
    #[error("queue is full")]
    Full(T),
    /// The shared node pool has no free slot.
    #[error("queue storage exhausted: {0}")]
    Exhausted(PoolError),
}

impl<T> QueueError<T> {
    /// Recover the item that could not be enqueued, if it still exists.
    pub fn into_inner(self) -> Option<T> {
        match self {
            Self::Closed(item) | Self::Full(item) => Some(item),
            Self::Exhausted(_) => None,
        }
    }
}

/// A dequeue found the queue closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("queue is closed")]
pub struct QueueClosed;
