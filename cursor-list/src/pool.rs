//! Fixed-capacity allocation pool shared by every list created from it.
//!
//! A [`Pool`] bounds two resources for the lifetime of the process:
//! - **nodes**: one per item stored in any list of the pool.
//! - **list headers**: one per live [`crate::List`].
//!
//! Claims are plain atomic counters so that lists guarded by *different*
//! locks can share one budget without ever locking each other.  Slots are
//! returned when an item leaves a list (remove, trim, free, drop) and when
//! a list is dropped, so a long-running session does not leak capacity.
//!
//! ```text
//!  Pool (Arc) ──┬── List A  (slab of nodes, claims from pool)
//!               └── List B
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::PoolError;

/// Default number of nodes a pool can hand out at once.
pub const DEFAULT_NODE_CAPACITY: usize = 1000;

/// Default number of list headers a pool can hand out at once.
pub const DEFAULT_LIST_CAPACITY: usize = 10;

/// Capacities of a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of nodes claimed at the same time.
    pub node_capacity: usize,
    /// Maximum number of lists alive at the same time.
    pub list_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            node_capacity: DEFAULT_NODE_CAPACITY,
            list_capacity: DEFAULT_LIST_CAPACITY,
        }
    }
}

#[derive(Debug)]
struct PoolInner {
    config: PoolConfig,
    nodes_in_use: AtomicUsize,
    lists_in_use: AtomicUsize,
}

/// Cloneable handle to a shared node / list-header budget.
#[derive(Debug, Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Default for Pool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl Pool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                config,
                nodes_in_use: AtomicUsize::new(0),
                lists_in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// Claim one node slot.
    pub fn claim_node(&self) -> Result<(), PoolError> {
        let capacity = self.inner.config.node_capacity;
        claim(&self.inner.nodes_in_use, capacity)
            .map(|_| ())
            .map_err(|_| PoolError::NodesExhausted { capacity })
    }

    /// Claim `n` node slots at once, or none of them.
    pub fn claim_nodes(&self, n: usize) -> Result<(), PoolError> {
        let capacity = self.inner.config.node_capacity;
        self.inner
            .nodes_in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(n).filter(|&total| total <= capacity)
            })
            .map(|_| ())
            .map_err(|_| PoolError::NodesExhausted { capacity })
    }

    /// Return `n` node slots.
    pub fn release_nodes(&self, n: usize) {
        if n == 0 {
            return;
        }
        let prev = self.inner.nodes_in_use.fetch_sub(n, Ordering::AcqRel);
        debug_assert!(prev >= n, "released {n} nodes but only {prev} were claimed");
    }

    /// Claim one list-header slot.
    pub fn claim_list(&self) -> Result<(), PoolError> {
        let capacity = self.inner.config.list_capacity;
        claim(&self.inner.lists_in_use, capacity)
            .map(|_| ())
            .map_err(|_| PoolError::ListsExhausted { capacity })
    }

    /// Return one list-header slot.
    pub fn release_list(&self) {
        let prev = self.inner.lists_in_use.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev >= 1, "released a list header that was never claimed");
    }

    /// `true` when both handles point at the same budget.
    pub fn same_as(&self, other: &Pool) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }

    pub fn node_capacity(&self) -> usize {
        self.inner.config.node_capacity
    }

    pub fn list_capacity(&self) -> usize {
        self.inner.config.list_capacity
    }

    pub fn nodes_in_use(&self) -> usize {
        self.inner.nodes_in_use.load(Ordering::Acquire)
    }

    pub fn lists_in_use(&self) -> usize {
        self.inner.lists_in_use.load(Ordering::Acquire)
    }

    /// Node slots that can still be claimed right now.
    pub fn nodes_available(&self) -> usize {
        self.node_capacity().saturating_sub(self.nodes_in_use())
    }
}

/// Increment `counter` unless it already reached `capacity`.
fn claim(counter: &AtomicUsize, capacity: usize) -> Result<usize, usize> {
    counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
        (used < capacity).then_some(used + 1)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
