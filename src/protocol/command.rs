//! Command definitions
//!
//! Represents commands from clients.

use bytes::Bytes;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    LPush = 0x01,
    RPush = 0x02,
    LPop = 0x03,
    RPop = 0x04,
    LLen = 0x05,
    Del = 0x06,
    Ping = 0x07,
}

impl CommandType {
    /// Command name as clients know it
    pub fn name(self) -> &'static str {
        match self {
            CommandType::LPush => "LPUSH",
            CommandType::RPush => "RPUSH",
            CommandType::LPop => "LPOP",
            CommandType::RPop => "RPOP",
            CommandType::LLen => "LLEN",
            CommandType::Del => "DEL",
            CommandType::Ping => "PING",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Push values onto the front, one at a time, in order
    LPush { key: Vec<u8>, values: Vec<Bytes> },

    /// Push values onto the back, in order
    RPush { key: Vec<u8>, values: Vec<Bytes> },

    /// Pop the front value
    LPop { key: Vec<u8> },

    /// Pop the back value
    RPop { key: Vec<u8> },

    /// Length of a key's deque
    LLen { key: Vec<u8> },

    /// Delete a key
    Del { key: Vec<u8> },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::LPush { .. } => CommandType::LPush,
            Command::RPush { .. } => CommandType::RPush,
            Command::LPop { .. } => CommandType::LPop,
            Command::RPop { .. } => CommandType::RPop,
            Command::LLen { .. } => CommandType::LLen,
            Command::Del { .. } => CommandType::Del,
            Command::Ping => CommandType::Ping,
        }
    }

    /// The key this command targets, if any
    pub fn key(&self) -> Option<&[u8]> {
        match self {
            Command::LPush { key, .. }
            | Command::RPush { key, .. }
            | Command::LPop { key }
            | Command::RPop { key }
            | Command::LLen { key }
            | Command::Del { key } => Some(key),
            Command::Ping => None,
        }
    }
}
