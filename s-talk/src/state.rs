//! Worker-role state types and the shared shutdown signal.
//!
//! Every role has the same two-state lifecycle:
//!
//! ```text
//!  RUNNING ──termination token / shutdown / error──▶ STOPPED
//! ```
//!
//! There is no way back: a stopped role is never restarted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The four concurrent workers of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Terminal → outbound queue.
    Reader,
    /// Outbound queue → network.
    Sender,
    /// Network → inbound queue.
    Receiver,
    /// Inbound queue → terminal.
    Printer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Reader, Role::Sender, Role::Receiver, Role::Printer];

    /// Thread name used when the role is spawned.
    pub fn thread_name(self) -> &'static str {
        match self {
            Self::Reader => "s-talk-reader",
            Self::Sender => "s-talk-sender",
            Self::Receiver => "s-talk-receiver",
            Self::Printer => "s-talk-printer",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleState {
    #[default]
    Running,
    Stopped,
}

impl fmt::Display for RoleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Why a role left its loop without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleExit {
    /// The role handled the termination token.
    TokenProcessed,
    /// Another role asked it to stop.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Shutdown
// ---------------------------------------------------------------------------

/// Cooperative stop request shared by all roles of one session.
///
/// Roles check it at their own safe points; nothing is interrupted
/// mid-operation.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every role to stop. Idempotent.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// RoleStates
// ---------------------------------------------------------------------------

/// Live view of which roles are still running.
#[derive(Debug, Clone, Default)]
pub struct RoleStates {
    stopped: Arc<[AtomicBool; 4]>,
}

impl RoleStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: Role) -> RoleState {
        if self.stopped[role.index()].load(Ordering::Acquire) {
            RoleState::Stopped
        } else {
            RoleState::Running
        }
    }

    /// Record the one-way transition to [`RoleState::Stopped`].
    pub fn mark_stopped(&self, role: Role) {
        self.stopped[role.index()].store(true, Ordering::Release);
    }

    pub fn all_stopped(&self) -> bool {
        Role::ALL
            .iter()
            .all(|&role| self.get(role) == RoleState::Stopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_is_shared_between_clones() {
        let shutdown = Shutdown::new();
        let other = shutdown.clone();
        assert!(!other.is_triggered());
        shutdown.trigger();
        shutdown.trigger();
        assert!(other.is_triggered());
    }

    #[test]
    fn roles_start_running_and_stop_once() {
        let states = RoleStates::new();
        assert!(Role::ALL.iter().all(|&r| states.get(r) == RoleState::Running));
        states.mark_stopped(Role::Sender);
        assert_eq!(states.get(Role::Sender), RoleState::Stopped);
        assert_eq!(states.get(Role::Reader), RoleState::Running);
        assert!(!states.all_stopped());
        Role::ALL.iter().for_each(|&r| states.mark_stopped(r));
        assert!(states.all_stopped());
    }

    #[test]
    fn thread_names_are_distinct() {
        let mut names: Vec<_> = Role::ALL.iter().map(|r| r.thread_name()).collect();
        names.dedup();
        assert_eq!(names.len(), 4);
        assert_eq!(Role::Printer.to_string(), "Printer");
    }
}
