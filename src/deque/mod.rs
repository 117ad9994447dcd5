//! Deque Module
//!
//! Packed storage for one key's element sequence.
//!
//! ## Responsibilities
//! - Hold encoded records in bounded, contiguous nodes
//! - Push/pop at both ends in amortized O(1)
//! - Keep element count and byte size cached for O(1) queries
//!
//! ## Structure
//! ```text
//!   head                                         tail
//!    │                                             │
//!    ▼                                             ▼
//! ┌────────┐      ┌────────┐      ┌────────┐   ┌────────┐
//! │ Node 0 │ ◀──▶ │ Node 3 │ ◀──▶ │ Node 1 │◀─▶│ Node 2 │
//! └────────┘      └────────┘      └────────┘   └────────┘
//!   (slot indices into the arena; order comes from the links)
//! ```
//!
//! Neither type locks internally. Callers serialize access per deque (the
//! keyspace does this with its shard locks).

mod list;
mod node;

pub use list::Deque;
pub use node::{PackedNode, Records};
