//! Session configuration.
//!
//! The three startup parameters (local port, remote host, remote port) come
//! from the command line; the remaining knobs have defaults.  A [`Config`]
//! is validated once, before any role starts, so a malformed value never
//! reaches the workers.

use std::time::Duration;

use cursor_list::pool::{PoolConfig, DEFAULT_NODE_CAPACITY};

use crate::error::TalkError;

/// How often a blocked network receive wakes up to check for shutdown.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One pool serves the outbound and the inbound queue.
const QUEUES_PER_SESSION: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// UDP port this side listens on.
    pub local_port: u16,
    /// Host name or address of the peer.
    pub remote_host: String,
    /// UDP port the peer listens on.
    pub remote_port: u16,
    /// Node budget shared by both queues.
    pub node_capacity: usize,
    /// Per-queue bound; producers block when it is reached.
    pub queue_capacity: Option<usize>,
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(local_port: u16, remote_host: impl Into<String>, remote_port: u16) -> Self {
        Self {
            local_port,
            remote_host: remote_host.into(),
            remote_port,
            node_capacity: DEFAULT_NODE_CAPACITY,
            queue_capacity: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), TalkError> {
        if self.local_port == 0 {
            return Err(TalkError::Config("local port must be non-zero".into()));
        }
        if self.remote_port == 0 {
            return Err(TalkError::Config("remote port must be non-zero".into()));
        }
        if self.remote_host.trim().is_empty() {
            return Err(TalkError::Config("remote host is empty".into()));
        }
        if self.node_capacity == 0 {
            return Err(TalkError::Config("node capacity must be non-zero".into()));
        }
        if self.queue_capacity == Some(0) {
            return Err(TalkError::Config("queue capacity must be non-zero".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(TalkError::Config("poll interval must be non-zero".into()));
        }
        Ok(())
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            node_capacity: self.node_capacity,
            list_capacity: QUEUES_PER_SESSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::new(3000, "localhost", 3001);
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.pool_config().list_capacity, 2);
        assert_eq!(config.pool_config().node_capacity, DEFAULT_NODE_CAPACITY);
    }

    #[test]
    fn zero_ports_are_rejected() {
        assert!(matches!(
            Config::new(0, "localhost", 3001).validate(),
            Err(TalkError::Config(_))
        ));
        assert!(matches!(
            Config::new(3000, "localhost", 0).validate(),
            Err(TalkError::Config(_))
        ));
    }

    #[test]
    fn blank_host_is_rejected() {
        assert!(Config::new(3000, "  ", 3001).validate().is_err());
    }

    #[test]
    fn zero_capacities_are_rejected() {
        let mut config = Config::new(3000, "localhost", 3001);
        config.queue_capacity = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::new(3000, "localhost", 3001);
        config.node_capacity = 0;
        assert!(config.validate().is_err());
    }
}
