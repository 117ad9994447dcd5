//! Keyspace Module
//!
//! The key -> deque registry.
//!
//! ## Responsibilities
//! - Create a deque on the first push to a key
//! - Remove a deque as soon as a pop drains it
//! - Serialize all operations on one key
//!
//! ## Data Structure Choice
//! A fixed set of shards, each a `HashMap` behind a `parking_lot::Mutex`:
//! - One lock acquisition per command; operations on different shards run
//!   in parallel
//! - Create/remove happen under the same lock as the push/pop that causes
//!   them, so a concurrent push can never land in a deque being dropped
//! - An emptied key is indistinguishable from one that never existed

mod store;

pub use store::Keyspace;
