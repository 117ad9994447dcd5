//! Back-length trailer
//!
//! Every record stored in a node is followed by its own length, written so it
//! can be read starting from the last byte. Seven bits per byte; the first
//! byte holds the most significant bits and is the only byte without the
//! continuation flag.

use crate::error::{DequeError, Result};

/// Longest trailer: 5 x 7 bits covers any record with a 32-bit length header
pub const MAX_BACKLEN_SIZE: usize = 5;

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u8 = 0x7F;

/// Number of trailer bytes needed for a record of `len` bytes
pub fn backlen_len(len: usize) -> usize {
    if len < 1 << 7 {
        1
    } else if len < 1 << 14 {
        2
    } else if len < 1 << 21 {
        3
    } else if len < 1 << 28 {
        4
    } else {
        5
    }
}

/// Write the trailer for a record of `len` bytes into `out`
///
/// Returns the number of bytes written. `out` must hold at least
/// `backlen_len(len)` bytes.
pub fn encode_backlen(len: usize, out: &mut [u8]) -> usize {
    let size = backlen_len(len);
    for (i, slot) in out[..size].iter_mut().enumerate() {
        let shift = 7 * (size - 1 - i);
        let mut byte = ((len >> shift) as u8) & PAYLOAD_MASK;
        if i > 0 {
            byte |= CONTINUATION;
        }
        *slot = byte;
    }
    size
}

/// Read a trailer that ends at the last byte of `buf`
///
/// Returns `(record_len, trailer_size)`.
pub fn decode_backlen(buf: &[u8]) -> Result<(usize, usize)> {
    let mut value = 0usize;
    let mut consumed = 0usize;

    for &byte in buf.iter().rev().take(MAX_BACKLEN_SIZE) {
        value |= ((byte & PAYLOAD_MASK) as usize) << (7 * consumed);
        consumed += 1;
        if byte & CONTINUATION == 0 {
            return Ok((value, consumed));
        }
    }

    Err(DequeError::CorruptRecord(format!(
        "unterminated back-length after {} bytes",
        consumed
    )))
}
