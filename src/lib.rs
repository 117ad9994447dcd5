//! # PackDeque
//!
//! An in-memory deque store with:
//! - Compact tiered element encoding (integers and strings sized to fit)
//! - Packed multi-node deques with O(1) push/pop at both ends
//! - Sharded keyspace with per-shard serialization
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │        (LPUSH / RPUSH / LPOP / RPOP / LLEN / DEL)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Keyspace                                │
//! │                (Mutex per shard)                             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Deque    │ ───────▶ │ PackedNode  │ ◀── Element Codec
//!   │ (node list) │          │  (records)  │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod codec;
pub mod deque;
pub mod engine;
pub mod keyspace;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{Record, Tier};
pub use config::{Config, NodeLimits};
pub use deque::{Deque, PackedNode};
pub use engine::{Engine, Reply};
pub use error::{DequeError, Result};
pub use keyspace::Keyspace;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PackDeque
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
