//! Error type shared by the session and its roles.
//!
//! Storage errors from `cursor-list` convert with `?`; I/O errors are
//! tagged with the side (network or terminal) that produced them.

use cursor_list::{ListError, PoolError};
use thiserror::Error;

use crate::state::Role;

/// Everything that can end a session early.
///
/// Errors are scoped to the role that hit them: the session shuts the other
/// roles down cooperatively and reports the error instead of aborting the
/// process.
#[derive(Error, Debug)]
pub enum TalkError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Cannot resolve {host}:{port}")]
    Resolve { host: String, port: u16 },
    #[error("Network error: {0}")]
    Network(#[source] std::io::Error),
    #[error("Terminal error: {0}")]
    Terminal(#[source] std::io::Error),
    #[error("Queue storage exhausted: {0}")]
    Storage(#[from] PoolError),
    #[error("Session setup failed: {0}")]
    Setup(#[from] ListError),
    #[error("Cannot start {0} thread: {1}")]
    Spawn(Role, #[source] std::io::Error),
    #[error("{0} role panicked")]
    Panicked(Role),
}
