//! Multi-node deque
//!
//! Packed nodes linked front to back through an index arena. The deque owns
//! every node exclusively; links are slot indices, never references.
//!
//! ## Split / Merge Policy
//! - Split is reactive: a push that the end node rejects with
//!   `CapacityExceeded` allocates a fresh node at that end.
//! - Merge is deferred: a node emptied by a pop is released and its
//!   neighbours relinked. Partially filled neighbours are never rebalanced.

use std::fmt;
use std::iter;

use bytes::Bytes;

use crate::codec::Record;
use crate::config::NodeLimits;
use crate::error::{DequeError, Result};

use super::node::PackedNode;

/// Index of a node slot in the deque's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

/// Arena slot: a node plus its neighbours
struct Link {
    node: PackedNode,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// One key's ordered element sequence
pub struct Deque {
    /// Node arena; released slots hold an unallocated node
    slots: Vec<Link>,

    /// Released slots available for reuse
    free: Vec<NodeId>,

    /// Node holding the front element
    head: Option<NodeId>,

    /// Node holding the back element
    tail: Option<NodeId>,

    /// Total element count across all nodes
    len: usize,

    /// Total encoded bytes across all nodes
    byte_size: usize,

    /// Thresholds handed to every new node
    limits: NodeLimits,
}

impl Deque {
    /// Create an empty deque with default node limits
    pub fn new() -> Self {
        Self::with_limits(NodeLimits::default())
    }

    /// Create an empty deque whose nodes use `limits`
    pub fn with_limits(limits: NodeLimits) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            byte_size: 0,
            limits,
        }
    }

    // =========================================================================
    // Push Operations
    // =========================================================================

    /// Push each value onto the front in order
    ///
    /// The last value ends up frontmost, exactly as if pushed one at a time.
    /// Every value is encoded before any is linked, so an error leaves the
    /// deque untouched. Returns the new length.
    pub fn push_left<I, V>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        for record in encode_all(values)? {
            self.push_record_front(&record)?;
        }
        Ok(self.len)
    }

    /// Push each value onto the back in order
    ///
    /// The last value ends up backmost. Returns the new length.
    pub fn push_right<I, V>(&mut self, values: I) -> Result<usize>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        for record in encode_all(values)? {
            self.push_record_back(&record)?;
        }
        Ok(self.len)
    }

    fn push_record_front(&mut self, record: &Record) -> Result<()> {
        if let Some(id) = self.head {
            match self.node_mut(id).push_front(record) {
                Ok(()) => {
                    self.account_push(record);
                    return Ok(());
                }
                Err(DequeError::CapacityExceeded) => {}
                Err(e) => return Err(e),
            }
        }

        let id = self.alloc_node();
        self.link_front(id);
        self.node_mut(id).push_front(record)?;
        self.account_push(record);
        Ok(())
    }

    fn push_record_back(&mut self, record: &Record) -> Result<()> {
        if let Some(id) = self.tail {
            match self.node_mut(id).push_back(record) {
                Ok(()) => {
                    self.account_push(record);
                    return Ok(());
                }
                Err(DequeError::CapacityExceeded) => {}
                Err(e) => return Err(e),
            }
        }

        let id = self.alloc_node();
        self.link_back(id);
        self.node_mut(id).push_back(record)?;
        self.account_push(record);
        Ok(())
    }

    // =========================================================================
    // Pop Operations
    // =========================================================================

    /// Remove and return the front element, or `None` when empty
    pub fn pop_left(&mut self) -> Result<Option<Bytes>> {
        let Some(id) = self.head else {
            return Ok(None);
        };

        let record = self.node_mut(id).pop_front().map_err(|e| {
            tracing::error!(slot = id.0, error = %e, "failed to pop deque head node");
            e
        })?;

        self.account_pop(id, &record);
        Ok(Some(record.into_value()))
    }

    /// Remove and return the back element, or `None` when empty
    pub fn pop_right(&mut self) -> Result<Option<Bytes>> {
        let Some(id) = self.tail else {
            return Ok(None);
        };

        let record = self.node_mut(id).pop_back().map_err(|e| {
            tracing::error!(slot = id.0, error = %e, "failed to pop deque tail node");
            e
        })?;

        self.account_pop(id, &record);
        Ok(Some(record.into_value()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of elements (O(1))
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Encoded bytes across all nodes
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn limits(&self) -> NodeLimits {
        self.limits
    }

    /// Live nodes, head to tail
    pub fn nodes(&self) -> impl Iterator<Item = &PackedNode> + '_ {
        self.node_ids().map(move |id| &self.slots[id.0].node)
    }

    /// Element values, front to back
    pub fn iter(&self) -> impl Iterator<Item = Result<Bytes>> + '_ {
        self.nodes()
            .flat_map(PackedNode::records)
            .map(|record| record.map(Record::into_value))
    }

    // =========================================================================
    // Arena Management
    // =========================================================================

    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        iter::successors(self.head, move |id| self.slots[id.0].next)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut PackedNode {
        &mut self.slots[id.0].node
    }

    fn alloc_node(&mut self) -> NodeId {
        let link = Link {
            node: PackedNode::new(self.limits),
            prev: None,
            next: None,
        };

        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = link;
                id
            }
            None => {
                self.slots.push(link);
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn link_front(&mut self, id: NodeId) {
        self.slots[id.0].prev = None;
        self.slots[id.0].next = self.head;
        match self.head {
            Some(old) => self.slots[old.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn link_back(&mut self, id: NodeId) {
        self.slots[id.0].next = None;
        self.slots[id.0].prev = self.tail;
        match self.tail {
            Some(old) => self.slots[old.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
    }

    /// Unlink a node, drop its buffer and queue the slot for reuse
    fn release(&mut self, id: NodeId) {
        let prev = self.slots[id.0].prev;
        let next = self.slots[id.0].next;

        match prev {
            Some(p) => self.slots[p.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n.0].prev = prev,
            None => self.tail = prev,
        }

        self.slots[id.0] = Link {
            node: PackedNode::new(self.limits),
            prev: None,
            next: None,
        };

        // Nothing linked: the arena itself can go
        if self.head.is_none() {
            self.slots.clear();
            self.free.clear();
        } else {
            self.free.push(id);
        }
    }

    fn account_push(&mut self, record: &Record) {
        self.len += 1;
        self.byte_size += record.encoded_len();
    }

    fn account_pop(&mut self, id: NodeId, record: &Record) {
        self.len -= 1;
        self.byte_size -= record.encoded_len();
        if self.slots[id.0].node.is_empty() {
            self.release(id);
        }
    }
}

impl Default for Deque {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deque")
            .field("len", &self.len)
            .field("byte_size", &self.byte_size)
            .field("node_count", &self.node_count())
            .field("limits", &self.limits)
            .finish()
    }
}

fn encode_all<I, V>(values: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = V>,
    V: AsRef<[u8]>,
{
    values
        .into_iter()
        .map(|value| Record::encode(value.as_ref()))
        .collect()
}
