//! Configuration for PackDeque
//!
//! Centralized configuration with sensible defaults.

use crate::error::{DequeError, Result};

/// Capacity thresholds for a single packed node
///
/// Thresholds only change how many nodes a deque uses internally, never the
/// order or content of its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLimits {
    /// Max encoded bytes per node (records plus back-length trailers)
    pub max_bytes: usize,

    /// Max records per node
    pub max_entries: usize,
}

impl NodeLimits {
    pub const fn new(max_bytes: usize, max_entries: usize) -> Self {
        Self {
            max_bytes,
            max_entries,
        }
    }
}

impl Default for NodeLimits {
    fn default() -> Self {
        Self {
            max_bytes: 8 * 1024, // 8 KB
            max_entries: 1024,
        }
    }
}

/// Main configuration for a PackDeque instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Deque Configuration
    // -------------------------------------------------------------------------
    /// Per-node capacity thresholds used by every deque in the keyspace
    pub node_limits: NodeLimits,

    // -------------------------------------------------------------------------
    // Keyspace Configuration
    // -------------------------------------------------------------------------
    /// Number of keyspace shards (each shard has its own lock)
    pub keyspace_shards: usize,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max connections waiting for or being served by a worker
    pub max_connections: usize,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_limits: NodeLimits::default(),
            keyspace_shards: 16,
            listen_addr: "127.0.0.1:6380".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings that would leave the server unable to make progress
    pub fn validate(&self) -> Result<()> {
        if self.node_limits.max_bytes == 0 {
            return Err(DequeError::Config(
                "node_limits.max_bytes must be greater than 0".to_string(),
            ));
        }
        if self.node_limits.max_entries == 0 {
            return Err(DequeError::Config(
                "node_limits.max_entries must be greater than 0".to_string(),
            ));
        }
        if self.keyspace_shards == 0 {
            return Err(DequeError::Config(
                "keyspace_shards must be greater than 0".to_string(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(DequeError::Config(
                "worker_threads must be greater than 0".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(DequeError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set both node thresholds at once
    pub fn node_limits(mut self, limits: NodeLimits) -> Self {
        self.config.node_limits = limits;
        self
    }

    /// Set the max encoded bytes per node
    pub fn node_max_bytes(mut self, bytes: usize) -> Self {
        self.config.node_limits.max_bytes = bytes;
        self
    }

    /// Set the max records per node
    pub fn node_max_entries(mut self, entries: usize) -> Self {
        self.config.node_limits.max_entries = entries;
        self
    }

    /// Set the number of keyspace shards
    pub fn keyspace_shards(mut self, shards: usize) -> Self {
        self.config.keyspace_shards = shards;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of queued or active connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
