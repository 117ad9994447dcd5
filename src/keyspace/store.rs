//! Keyspace implementation
//!
//! Sharded HashMap of deques with one Mutex per shard.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::NodeLimits;
use crate::deque::Deque;
use crate::error::Result;

type Shard = HashMap<Vec<u8>, Deque>;

/// Sharded in-memory map from key to deque
pub struct Keyspace {
    /// Key partitions, chosen by key hash
    shards: Vec<Mutex<Shard>>,

    /// Node thresholds for newly created deques
    limits: NodeLimits,
}

impl Keyspace {
    /// Create an empty keyspace with `shard_count` partitions (at least one)
    pub fn new(shard_count: usize, limits: NodeLimits) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards, limits }
    }

    // =========================================================================
    // Push Operations
    // =========================================================================

    /// Push values onto the front of `key`'s deque, creating it if needed
    ///
    /// Returns the new length. An empty batch on a missing key creates
    /// nothing and returns 0.
    pub fn push_left<I, V>(&self, key: &[u8], values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        self.push_with(key, |deque| deque.push_left(values))
    }

    /// Push values onto the back of `key`'s deque, creating it if needed
    pub fn push_right<I, V>(&self, key: &[u8], values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        self.push_with(key, |deque| deque.push_right(values))
    }

    fn push_with<F>(&self, key: &[u8], push: F) -> Result<usize>
    where
        F: FnOnce(&mut Deque) -> Result<usize>,
    {
        let mut shard = self.shard(key).lock();

        if let Some(deque) = shard.get_mut(key) {
            return push(deque);
        }

        let mut deque = Deque::with_limits(self.limits);
        let len = push(&mut deque)?;
        if len > 0 {
            tracing::trace!(key_len = key.len(), "created deque");
            shard.insert(key.to_vec(), deque);
        }
        Ok(len)
    }

    // =========================================================================
    // Pop Operations
    // =========================================================================

    /// Pop the front element of `key`'s deque; `None` if absent or empty
    pub fn pop_left(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.pop_with(key, Deque::pop_left)
    }

    /// Pop the back element of `key`'s deque; `None` if absent or empty
    pub fn pop_right(&self, key: &[u8]) -> Result<Option<Bytes>> {
        self.pop_with(key, Deque::pop_right)
    }

    fn pop_with<F>(&self, key: &[u8], pop: F) -> Result<Option<Bytes>>
    where
        F: FnOnce(&mut Deque) -> Result<Option<Bytes>>,
    {
        let mut shard = self.shard(key).lock();

        let Some(deque) = shard.get_mut(key) else {
            return Ok(None);
        };

        let value = pop(deque)?;
        if deque.is_empty() {
            tracing::trace!(key_len = key.len(), "removed drained deque");
            shard.remove(key);
        }
        Ok(value)
    }

    // =========================================================================
    // Key Operations
    // =========================================================================

    /// Length of `key`'s deque, 0 if absent
    pub fn len(&self, key: &[u8]) -> usize {
        self.shard(key).lock().get(key).map_or(0, Deque::len)
    }

    /// Drop `key`'s deque and all its nodes. Returns whether it existed.
    pub fn delete(&self, key: &[u8]) -> bool {
        self.shard(key).lock().remove(key).is_some()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.shard(key).lock().contains_key(key)
    }

    /// Run `f` against `key`'s deque while holding its shard lock
    pub fn with_deque<F, R>(&self, key: &[u8], f: F) -> Option<R>
    where
        F: FnOnce(&Deque) -> R,
    {
        self.shard(key).lock().get(key).map(f)
    }

    /// Number of keys across all shards
    pub fn key_count(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.key_count() == 0
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: &[u8]) -> &Mutex<Shard> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}
