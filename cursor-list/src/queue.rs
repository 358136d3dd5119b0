//! Blocking FIFO queue built on [`List`].
//!
//! The discipline is *prepend to enqueue, trim to dequeue*: items enter at
//! the head and leave from the tail, so the first item enqueued is the first
//! one dequeued.
//!
//! ```text
//!   enqueue ──▶ [ head ... tail ] ──▶ dequeue
//!               └── Mutex<List> ──┘
//!        not_full ▲          ▼ not_empty
//! ```
//!
//! Every list access happens under the queue's own mutex; the queue never
//! takes any other lock while holding it.
//!
//! # Shutdown
//!
//! [`SyncQueue::close`] is the cancellation signal: it discards whatever is
//! still queued and wakes every blocked producer and consumer.  From then on
//! `dequeue` returns [`QueueClosed`] and `enqueue` returns
//! [`QueueError::Closed`].

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{ListError, QueueClosed, QueueError};
use crate::list::List;
use crate::pool::Pool;

struct State<T> {
    list: List<T>,
    closed: bool,
}

/// A mutex-guarded [`List`] with blocking hand-off between threads.
pub struct SyncQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    /// `None` = bounded only by the pool.
    capacity: Option<usize>,
}

impl<T> SyncQueue<T> {
    /// Create a queue bounded only by the node pool.
    pub fn new(pool: &Pool) -> Result<Self, ListError> {
        Self::with_capacity(pool, None)
    }

    /// Create a queue holding at most `capacity` items; producers block
    /// while it is full.
    pub fn bounded(pool: &Pool, capacity: usize) -> Result<Self, ListError> {
        Self::with_capacity(pool, Some(capacity))
    }

    pub fn with_capacity(pool: &Pool, capacity: Option<usize>) -> Result<Self, ListError> {
        Ok(Self {
            state: Mutex::new(State {
                list: List::create(pool)?,
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        })
    }

    /// Add `item`, blocking while the queue is at its capacity bound.
    pub fn enqueue(&self, item: T) -> Result<(), QueueError<T>> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(QueueError::Closed(item));
            }
            if !self.is_full(&state) {
                return self.push(state, item);
            }
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Add `item` without blocking.
    pub fn try_enqueue(&self, item: T) -> Result<(), QueueError<T>> {
        let state = self.lock();
        if state.closed {
            return Err(QueueError::Closed(item));
        }
        if self.is_full(&state) {
            return Err(QueueError::Full(item));
        }
        self.push(state, item)
    }

    /// Take the oldest item, blocking while the queue is empty.
    pub fn dequeue(&self) -> Result<T, QueueClosed> {
        let mut state = self.lock();
        loop {
            if let Some(item) = self.pop(&mut state)? {
                drop(state);
                self.not_full.notify_one();
                return Ok(item);
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`dequeue`](Self::dequeue) but gives up after `timeout`,
    /// returning `Ok(None)`.  A timeout too large to represent waits without
    /// a deadline.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<Option<T>, QueueClosed> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.dequeue().map(Some);
        };
        let mut state = self.lock();
        loop {
            if let Some(item) = self.pop(&mut state)? {
                drop(state);
                self.not_full.notify_one();
                return Ok(Some(item));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            state = self
                .not_empty
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Take the oldest item if there is one.
    pub fn try_dequeue(&self) -> Result<Option<T>, QueueClosed> {
        let mut state = self.lock();
        let item = self.pop(&mut state)?;
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        Ok(item)
    }

    /// Stop the queue: drop pending items and wake every waiter.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let discarded = state.list.len();
        state.list.clear();
        drop(state);
        if discarded > 0 {
            log::debug!("queue closed, {discarded} pending item(s) discarded");
        }
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_full(&self, state: &State<T>) -> bool {
        self.capacity
            .is_some_and(|capacity| state.list.len() >= capacity)
    }

    fn push(&self, mut state: MutexGuard<'_, State<T>>, item: T) -> Result<(), QueueError<T>> {
        match state.list.prepend(item) {
            Ok(()) => {
                drop(state);
                self.not_empty.notify_one();
                Ok(())
            }
            Err(ListError::NoResource(e)) => Err(QueueError::Exhausted(e)),
        }
    }

    fn pop(&self, state: &mut State<T>) -> Result<Option<T>, QueueClosed> {
        if state.closed {
            return Err(QueueClosed);
        }
        Ok(state.list.trim())
    }
}

impl<T> fmt::Debug for SyncQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SyncQueue")
            .field("len", &state.list.len())
            .field("capacity", &self.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
