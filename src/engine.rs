//! Engine Module
//!
//! Executes parsed commands against the keyspace.
//!
//! ## Responsibilities
//! - Validate configuration on startup
//! - Route commands to keyspace operations
//! - Reject malformed requests (push without values)
//! - Translate results into protocol-neutral replies

use bytes::Bytes;

use crate::config::Config;
use crate::error::{DequeError, Result};
use crate::keyspace::Keyspace;
use crate::protocol::{Command, CommandType};

/// Result of executing a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A count (new length, current length, keys deleted)
    Integer(i64),

    /// A popped value in its original form
    Value(Bytes),

    /// Nothing to pop
    Nil,

    /// Health check answer
    Pong,
}

/// The command engine
///
/// ## Concurrency Model
///
/// `Engine` is shared across connection workers behind an `Arc`. It holds no
/// lock of its own: every command touches exactly one key, and the keyspace
/// serializes commands per shard.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Key -> deque registry
    keyspace: Keyspace,
}

impl Engine {
    /// Create an engine with the given config
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let keyspace = Keyspace::new(config.keyspace_shards, config.node_limits);
        tracing::debug!(
            shards = config.keyspace_shards,
            node_max_bytes = config.node_limits.max_bytes,
            node_max_entries = config.node_limits.max_entries,
            "engine initialized"
        );

        Ok(Self { config, keyspace })
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        tracing::trace!(command = command.command_type().name(), "executing command");

        match command {
            Command::LPush { key, values } => self.lpush(&key, &values).map(count_reply),
            Command::RPush { key, values } => self.rpush(&key, &values).map(count_reply),
            Command::LPop { key } => self.lpop(&key).map(value_reply),
            Command::RPop { key } => self.rpop(&key).map(value_reply),
            Command::LLen { key } => Ok(count_reply(self.llen(&key))),
            Command::Del { key } => Ok(Reply::Integer(self.del(&key) as i64)),
            Command::Ping => Ok(Reply::Pong),
        }
    }

    /// Push values onto the front of `key`; returns the new length
    pub fn lpush<V: AsRef<[u8]>>(&self, key: &[u8], values: &[V]) -> Result<usize> {
        require_values(CommandType::LPush, values)?;
        self.keyspace.push_left(key, values)
    }

    /// Push values onto the back of `key`; returns the new length
    pub fn rpush<V: AsRef<[u8]>>(&self, key: &[u8], values: &[V]) -> Result<usize> {
        require_values(CommandType::RPush, values)?;
        self.keyspace.push_right(key, values)
    }

    /// Pop the front value of `key`
    pub fn lpop(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.keyspace.pop_left(key)
    }

    /// Pop the back value of `key`
    pub fn rpop(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.keyspace.pop_right(key)
    }

    /// Length of `key`'s deque (0 if absent)
    pub fn llen(&self, key: &[u8]) -> usize {
        self.keyspace.len(key)
    }

    /// Delete `key`; returns whether it existed
    pub fn del(&self, key: &[u8]) -> bool {
        self.keyspace.delete(key)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the keyspace
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn require_values<V>(command_type: CommandType, values: &[V]) -> Result<()> {
    if values.is_empty() {
        return Err(DequeError::Protocol(format!(
            "{} requires at least one value",
            command_type.name()
        )));
    }
    Ok(())
}

fn count_reply(count: usize) -> Reply {
    Reply::Integer(count as i64)
}

fn value_reply(value: Option<Bytes>) -> Reply {
    match value {
        Some(value) => Reply::Value(value),
        None => Reply::Nil,
    }
}
