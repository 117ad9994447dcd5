//! Error types for PackDeque
//!
//! Provides a unified error type for all operations.
//!
//! `CapacityExceeded` and `Empty` are node-level signals: the deque consumes
//! them and they never reach the command layer. `CorruptRecord` means a buffer
//! held bytes the codec did not produce.

use thiserror::Error;

/// Result type alias using DequeError
pub type Result<T> = std::result::Result<T, DequeError>;

/// Unified error type for PackDeque operations
#[derive(Debug, Error)]
pub enum DequeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Node Signals
    // -------------------------------------------------------------------------
    #[error("Node capacity exceeded")]
    CapacityExceeded,

    #[error("Node is empty")]
    Empty,

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Value too large: {len} bytes (max {max})", max = u32::MAX)]
    ValueTooLarge { len: usize },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
