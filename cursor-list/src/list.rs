//! Pool-backed doubly-linked list with a movable cursor.
//!
//! All positional operations go through the cursor ("current"), which is
//! either a node of the list or *none*.  *None* means "before the first
//! node" or "past the last node"; the list does not record which.
//!
//! # Cursor contract
//!
//! | operation       | cursor afterwards                                  |
//! |-----------------|----------------------------------------------------|
//! | `first`/`last`  | head / tail (none when empty)                      |
//! | `move_next`     | one step forward, none past the tail               |
//! | `move_prev`     | one step back, none before the head                |
//! | `insert_*`      | the new node                                       |
//! | `append`        | the new node                                       |
//! | `prepend`       | the new node                                       |
//! | `remove`        | the node that followed the removed one (or none)   |
//! | `trim`          | the new tail (or none)                             |
//! | `concat`        | head of the destination; source cursor none        |
//! | `search`        | matching node, none when nothing matched           |
//!
//! From a *none* cursor, `insert_after` and `insert_before` both make the
//! new node the head.
//!
//! Node storage is a [`Slab`]; every slot held by a list is also claimed
//! from the list's [`Pool`] and returned as soon as the item leaves.

use std::fmt;

use slab::Slab;

use crate::error::ListError;
use crate::pool::Pool;

type Key = usize;

struct Node<T> {
    prev: Option<Key>,
    next: Option<Key>,
    data: T,
}

impl<T> Node<T> {
    fn new(data: T) -> Self {
        Self {
            prev: None,
            next: None,
            data,
        }
    }
}

/// An ordered list of owned items navigated through a single cursor.
pub struct List<T> {
    head: Option<Key>,
    tail: Option<Key>,
    current: Option<Key>,
    len: usize,
    nodes: Slab<Node<T>>,
    pool: Pool,
}

impl<T> List<T> {
    /// Claim a list header from `pool` and return an empty list.
    pub fn create(pool: &Pool) -> Result<Self, ListError> {
        pool.claim_list()?;
        Ok(Self {
            head: None,
            tail: None,
            current: None,
            len: 0,
            nodes: Slab::new(),
            pool: pool.clone(),
        })
    }

    /// Number of items in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // -----------------------------------------------------------------------
    // Cursor movement
    // -----------------------------------------------------------------------

    /// Move the cursor to the head and return its item.
    pub fn first(&mut self) -> Option<&T> {
        self.current = self.head;
        self.current()
    }

    /// Move the cursor to the tail and return its item.
    pub fn last(&mut self) -> Option<&T> {
        self.current = self.tail;
        self.current()
    }

    /// Advance the cursor one node.
    ///
    /// Stepping past the tail leaves the cursor at none.  From none this is
    /// a no-op returning `None`.
    pub fn move_next(&mut self) -> Option<&T> {
        let key = self.current?;
        self.current = self.nodes[key].next;
        self.current()
    }

    /// Step the cursor back one node.
    ///
    /// Stepping before the head leaves the cursor at none.  From none this
    /// is a no-op returning `None`.
    pub fn move_prev(&mut self) -> Option<&T> {
        let key = self.current?;
        self.current = self.nodes[key].prev;
        self.current()
    }

    /// The item under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.current.map(|key| &self.nodes[key].data)
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.map(|key| &mut self.nodes[key].data)
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Insert `item` right after the cursor (as the head when the cursor is
    /// none) and move the cursor onto it.
    pub fn insert_after(&mut self, item: T) -> Result<(), ListError> {
        let key = self.alloc(item)?;
        self.link_after(self.current, key);
        self.current = Some(key);
        Ok(())
    }

    /// Insert `item` right before the cursor (as the head when the cursor is
    /// none) and move the cursor onto it.
    pub fn insert_before(&mut self, item: T) -> Result<(), ListError> {
        let key = self.alloc(item)?;
        let at = self.current.and_then(|cur| self.nodes[cur].prev);
        self.link_after(at, key);
        self.current = Some(key);
        Ok(())
    }

    /// Add `item` after the tail and move the cursor onto it.
    pub fn append(&mut self, item: T) -> Result<(), ListError> {
        let key = self.alloc(item)?;
        self.link_after(self.tail, key);
        self.current = Some(key);
        Ok(())
    }

    /// Add `item` before the head and move the cursor onto it.
    pub fn prepend(&mut self, item: T) -> Result<(), ListError> {
        let key = self.alloc(item)?;
        self.link_after(None, key);
        self.current = Some(key);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Take the item under the cursor; the cursor moves to its successor.
    pub fn remove(&mut self) -> Option<T> {
        let key = self.current?;
        let next = self.nodes[key].next;
        let data = self.unlink(key);
        self.current = next;
        Some(data)
    }

    /// Take the tail item; the cursor moves to the new tail.
    pub fn trim(&mut self) -> Option<T> {
        let key = self.tail?;
        let data = self.unlink(key);
        self.current = self.tail;
        Some(data)
    }

    /// Move every item of `other` to the end of `self`, keeping their order.
    ///
    /// `other` is left empty.  The cursor of `self` moves to its head.  When
    /// both lists share a pool no slot changes hands; otherwise the whole
    /// batch is claimed from this list's pool up front, so the operation
    /// either moves everything or nothing.
    pub fn concat(&mut self, other: &mut List<T>) -> Result<(), ListError> {
        let moved = other.len;
        if !self.pool.same_as(&other.pool) {
            self.pool.claim_nodes(moved)?;
            other.pool.release_nodes(moved);
        }

        let mut cursor = other.head;
        while let Some(key) = cursor {
            let node = other.nodes.remove(key);
            cursor = node.next;
            let new_key = self.nodes.insert(Node::new(node.data));
            self.link_after(self.tail, new_key);
        }
        other.reset();
        self.current = self.head;
        Ok(())
    }

    /// Hand every item, head to tail, to `cleanup` and empty the list.
    ///
    /// The list is empty and its slots are back in the pool before the first
    /// call, so a panicking `cleanup` leaks nothing.
    pub fn free(&mut self, mut cleanup: impl FnMut(T)) {
        let mut cursor = self.head;
        self.pool.release_nodes(self.len);
        self.reset();
        while let Some(key) = cursor {
            let node = self.nodes.remove(key);
            cursor = node.next;
            cleanup(node.data);
        }
        self.nodes.clear();
    }

    /// Drop every item and empty the list.
    pub fn clear(&mut self) {
        self.free(drop);
    }

    // -----------------------------------------------------------------------
    // Search & iteration
    // -----------------------------------------------------------------------

    /// Scan forward from the cursor (from the head when the cursor is none)
    /// for the first item where `matches(item, arg)` holds.
    ///
    /// On a match the cursor rests on it; otherwise the cursor ends at none,
    /// so the next search restarts from the head.
    pub fn search<A, F>(&mut self, mut matches: F, arg: &A) -> Option<&T>
    where
        A: ?Sized,
        F: FnMut(&T, &A) -> bool,
    {
        let mut cursor = self.current.or(self.head);
        while let Some(key) = cursor {
            let node = &self.nodes[key];
            if matches(&node.data, arg) {
                self.current = Some(key);
                return Some(&self.nodes[key].data);
            }
            cursor = node.next;
        }
        self.current = None;
        None
    }

    /// Iterate head to tail without touching the cursor.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn alloc(&mut self, data: T) -> Result<Key, ListError> {
        self.pool.claim_node()?;
        Ok(self.nodes.insert(Node::new(data)))
    }

    /// Splice `key` in after `at`, or in front of the head when `at` is none.
    fn link_after(&mut self, at: Option<Key>, key: Key) {
        let next = match at {
            Some(prev) => self.nodes[prev].next,
            None => self.head,
        };
        self.nodes[key].prev = at;
        self.nodes[key].next = next;
        match at {
            Some(prev) => self.nodes[prev].next = Some(key),
            None => self.head = Some(key),
        }
        match next {
            Some(next) => self.nodes[next].prev = Some(key),
            None => self.tail = Some(key),
        }
        self.len += 1;
    }

    /// Detach `key`, return its slot to the pool and hand back the item.
    /// The cursor is left for the caller to fix.
    fn unlink(&mut self, key: Key) -> T {
        let node = self.nodes.remove(key);
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        self.pool.release_nodes(1);
        node.data
    }

    fn reset(&mut self) {
        self.head = None;
        self.tail = None;
        self.current = None;
        self.len = 0;
    }
}

impl<T> Drop for List<T> {
    fn drop(&mut self) {
        self.pool.release_nodes(self.len);
        self.pool.release_list();
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Borrowing head-to-tail iterator, created by [`List::iter`].
pub struct Iter<'a, T> {
    list: &'a List<T>,
    next: Option<Key>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        let node = &self.list.nodes[key];
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.data)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
