//! `cursor-list` — a pool-backed cursor list and the blocking queue built on it.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐   prepend / trim   ┌──────────────┐
//!  │  SyncQueue   │───────────────────▶│     List     │
//!  │ Mutex+Condvar│                    │ cursor, slab │
//!  └──────────────┘                    └──────┬───────┘
//!                                             │ claim / release
//!                                      ┌──────▼───────┐
//!                                      │     Pool     │
//!                                      │ node + list  │
//!                                      │  capacities  │
//!                                      └──────────────┘
//! ```
//!
//! - [`pool`]  — shared fixed-capacity budget for nodes and list headers
//! - [`list`]  — doubly-linked list navigated through a movable cursor
//! - [`queue`] — FIFO hand-off between threads with close-based shutdown
//! - [`error`] — failure types (distinct from "no item" `None` returns)

pub mod error;
pub mod list;
pub mod pool;
pub mod queue;

pub use error::{ListError, PoolError, QueueClosed, QueueError};
pub use list::List;
pub use pool::{Pool, PoolConfig};
pub use queue::SyncQueue;
