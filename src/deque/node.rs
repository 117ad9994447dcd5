//! Packed node
//!
//! A contiguous buffer holding a run of encoded records. Live bytes sit
//! between `head` and `tail`; free space on either side lets the node grow
//! at both ends without moving its contents on every push.
//!
//! ```text
//!   0        head                               tail        capacity
//!   ├─ free ──┼── rec │ bl │ rec │ bl │ rec │ bl ──┼── free ──┤
//! ```

use std::fmt;

use crate::codec::{backlen_len, decode_backlen, Record};
use crate::config::NodeLimits;
use crate::error::{DequeError, Result};

/// Smallest buffer allocated for a node that holds anything
const MIN_CAPACITY: usize = 64;

#[derive(Clone, Copy)]
enum End {
    Front,
    Back,
}

/// A bounded run of encoded records
#[derive(Clone)]
pub struct PackedNode {
    /// Backing storage; only `buf[head..tail]` is meaningful
    buf: Vec<u8>,

    /// Offset of the first live byte
    head: usize,

    /// One past the last live byte
    tail: usize,

    /// Number of records in `buf[head..tail]`
    len: usize,

    /// Thresholds a push may not breach
    limits: NodeLimits,
}

impl PackedNode {
    /// Create an empty node; no storage is allocated until the first push
    pub fn new(limits: NodeLimits) -> Self {
        Self {
            buf: Vec::new(),
            head: 0,
            tail: 0,
            len: 0,
            limits,
        }
    }

    // =========================================================================
    // Push / Pop
    // =========================================================================

    /// Prepend a record
    ///
    /// Fails with `CapacityExceeded` if the node would exceed its thresholds.
    /// An empty node accepts any single record, however large.
    pub fn push_front(&mut self, record: &Record) -> Result<()> {
        let need = record.encoded_len();
        self.check_capacity(need)?;
        self.reserve(End::Front, need);

        let start = self.head - need;
        record.write_to(&mut self.buf[start..self.head]);
        self.head = start;
        self.len += 1;
        Ok(())
    }

    /// Append a record
    pub fn push_back(&mut self, record: &Record) -> Result<()> {
        let need = record.encoded_len();
        self.check_capacity(need)?;
        self.reserve(End::Back, need);

        let end = self.tail + need;
        record.write_to(&mut self.buf[self.tail..end]);
        self.tail = end;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the first record
    pub fn pop_front(&mut self) -> Result<Record> {
        if self.len == 0 {
            return Err(DequeError::Empty);
        }

        let live = &self.buf[self.head..self.tail];
        let (record, record_len) = Record::decode(live)?;
        let size = record_len + backlen_len(record_len);
        if size > live.len() {
            return Err(DequeError::CorruptRecord(format!(
                "record of {} bytes overruns node holding {}",
                size,
                live.len()
            )));
        }

        self.head += size;
        self.len -= 1;
        self.reset_if_empty();
        Ok(record)
    }

    /// Remove and return the last record
    pub fn pop_back(&mut self) -> Result<Record> {
        if self.len == 0 {
            return Err(DequeError::Empty);
        }

        let live = &self.buf[self.head..self.tail];
        let (record_len, trailer) = decode_backlen(live)?;
        let start = live.len().checked_sub(record_len + trailer).ok_or_else(|| {
            DequeError::CorruptRecord(format!(
                "back-length {} overruns node holding {}",
                record_len,
                live.len()
            ))
        })?;

        let (record, decoded_len) = Record::decode(&live[start..live.len() - trailer])?;
        if decoded_len != record_len {
            return Err(DequeError::CorruptRecord(format!(
                "back-length {} disagrees with record length {}",
                record_len, decoded_len
            )));
        }

        self.tail = self.head + start;
        self.len -= 1;
        self.reset_if_empty();
        Ok(record)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of records
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of the encoded sizes of all records
    pub fn byte_size(&self) -> usize {
        self.tail - self.head
    }

    /// Allocated buffer size
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn limits(&self) -> NodeLimits {
        self.limits
    }

    /// Records front to back
    pub fn records(&self) -> Records<'_> {
        Records {
            buf: &self.buf[self.head..self.tail],
            remaining: self.len,
        }
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn check_capacity(&self, need: usize) -> Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        if self.len + 1 > self.limits.max_entries
            || self.byte_size() + need > self.limits.max_bytes
        {
            return Err(DequeError::CapacityExceeded);
        }
        Ok(())
    }

    /// Make at least `need` free bytes available at `end`
    ///
    /// Grows the buffer geometrically (bounded by `max_bytes` unless a single
    /// oversized record needs more) or slides the live bytes over when the
    /// other side still has room. The pushing side gets three quarters of the
    /// free space.
    fn reserve(&mut self, end: End, need: usize) {
        let room = match end {
            End::Front => self.head,
            End::Back => self.buf.len() - self.tail,
        };
        if room >= need {
            return;
        }

        let used = self.byte_size();
        let target = used + need;
        let capacity = if target <= self.buf.len() {
            self.buf.len()
        } else {
            (self.buf.len() * 2)
                .max(MIN_CAPACITY)
                .min(self.limits.max_bytes)
                .max(target)
        };

        let free = capacity - used;
        let pushing_side = (free - free / 4).max(need);
        let front_gap = match end {
            End::Front => pushing_side,
            End::Back => free - pushing_side,
        };

        if capacity == self.buf.len() {
            self.buf.copy_within(self.head..self.tail, front_gap);
        } else {
            let mut grown = vec![0u8; capacity];
            grown[front_gap..front_gap + used].copy_from_slice(&self.buf[self.head..self.tail]);
            self.buf = grown;
        }

        self.head = front_gap;
        self.tail = front_gap + used;
    }

    fn reset_if_empty(&mut self) {
        if self.len == 0 {
            let mid = self.buf.len() / 2;
            self.head = mid;
            self.tail = mid;
        }
    }
}

impl fmt::Debug for PackedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedNode")
            .field("len", &self.len)
            .field("byte_size", &self.byte_size())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Iterator over a node's records, front to back
pub struct Records<'a> {
    buf: &'a [u8],
    remaining: usize,
}

impl Iterator for Records<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let buf = self.buf;
        let decoded = Record::decode(buf).and_then(|(record, record_len)| {
            let size = record_len + backlen_len(record_len);
            let rest = buf.get(size..).ok_or_else(|| {
                DequeError::CorruptRecord(format!("record of {} bytes overruns node", size))
            })?;
            Ok((record, rest))
        });

        match decoded {
            Ok((record, rest)) => {
                self.buf = rest;
                self.remaining -= 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
