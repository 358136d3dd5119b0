//! `s-talk` — a two-party text chat over UDP datagrams.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐  outbound  ┌──────────┐  datagrams  ┌──────────┐
//!  │  Reader  │──────────▶│  Sender  │────────────▶│   peer   │
//!  └────▲─────┘  SyncQueue └──────────┘             └────┬─────┘
//!       │ stdin                                          │
//!       │                                                ▼
//!  ┌────┴─────┐  inbound   ┌──────────┐  datagrams  ┌──────────┐
//!  │ terminal │◀──────────│ Printer  │◀────────────│ Receiver │
//!  └──────────┘   stdout   └──────────┘  SyncQueue  └──────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`config`]   — startup parameters and their validation
//! - [`message`]  — raw chat messages and the `!\n` termination token
//! - [`roles`]    — the four worker loops and the termination protocol
//! - [`session`]  — queue construction, thread lifecycle, final report
//! - [`socket`]   — datagram transport seam and its UDP implementation
//! - [`state`]    — role lifecycle types and the shared shutdown signal
//! - [`terminal`] — raw chunked terminal input/output
//! - [`error`]    — role-scoped error type
//!
//! The queues themselves come from the `cursor-list` crate.

pub mod config;
pub mod error;
pub mod message;
pub mod roles;
pub mod session;
pub mod socket;
pub mod state;
pub mod terminal;

pub use config::Config;
pub use error::TalkError;
pub use message::{Message, TERMINATION_TOKEN};
pub use session::{RoleOutcome, Session, SessionReport};
pub use socket::{Transport, UdpTransport};
pub use state::{Role, RoleExit, RoleState, Shutdown};
