//! Encoded record definitions
//!
//! A `Record` is the tagged form of one deque element. Each variant is one
//! tier; constructors guarantee the held value is inside that tier's range and
//! that no smaller tier would fit it.

use bytes::Bytes;

use crate::error::{DequeError, Result};

use super::backlen::{backlen_len, encode_backlen};

// =============================================================================
// Tags
// =============================================================================

const UINT7_MASK: u8 = 0x80; // 0xxxxxxx
const STR6_TAG: u8 = 0x80; // 10xxxxxx
const STR6_MASK: u8 = 0xC0;
const INT13_TAG: u8 = 0xC0; // 110xxxxx
const INT13_MASK: u8 = 0xE0;
const STR12_TAG: u8 = 0xE0; // 1110xxxx
const STR12_MASK: u8 = 0xF0;
const STR32_TAG: u8 = 0xF0;
const INT16_TAG: u8 = 0xF1;
const INT24_TAG: u8 = 0xF2;
const INT32_TAG: u8 = 0xF3;
const INT64_TAG: u8 = 0xF4;

// =============================================================================
// Tier Bounds (inclusive)
// =============================================================================

const UINT7_MAX: i64 = 127;
const INT13_MIN: i64 = -4096;
const INT13_MAX: i64 = 4095;
const INT24_MIN: i64 = -8_388_608;
const INT24_MAX: i64 = 8_388_607;
const STR6_MAX_LEN: usize = 63;
const STR12_MAX_LEN: usize = 4095;
const STR32_MAX_LEN: usize = u32::MAX as usize;

/// Longest canonical i64 literal: "-9223372036854775808"
const MAX_INT_LITERAL_LEN: usize = 20;

/// Encoding tier of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    UInt7,
    Int13,
    Int16,
    Int24,
    Int32,
    Int64,
    Str6,
    Str12,
    Str32,
}

impl Tier {
    /// True for the six integer tiers
    pub fn is_integer(self) -> bool {
        !matches!(self, Tier::Str6 | Tier::Str12 | Tier::Str32)
    }
}

/// One element in its tiered binary form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// 0 … 127
    UInt7(u8),
    /// -4096 … 4095
    Int13(i16),
    /// i16 range
    Int16(i16),
    /// -8388608 … 8388607
    Int24(i32),
    /// i32 range
    Int32(i32),
    /// i64 range
    Int64(i64),
    /// Up to 63 bytes
    Str6(Bytes),
    /// 64 … 4095 bytes
    Str12(Bytes),
    /// 4096 … u32::MAX bytes
    Str32(Bytes),
}

impl Record {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Encode a raw value into its smallest tier
    ///
    /// Canonical base-10 i64 literals take the integer path; anything else
    /// (including out-of-range or non-canonical integers such as `"007"`,
    /// `"+5"` or `"-0"`) is stored as a string.
    pub fn encode(value: &[u8]) -> Result<Self> {
        match parse_canonical_i64(value) {
            Some(n) => Ok(Self::from_int(n)),
            None => Self::from_bytes(Bytes::copy_from_slice(value)),
        }
    }

    /// Smallest integer tier containing `n`
    pub fn from_int(n: i64) -> Self {
        if (0..=UINT7_MAX).contains(&n) {
            Record::UInt7(n as u8)
        } else if (INT13_MIN..=INT13_MAX).contains(&n) {
            Record::Int13(n as i16)
        } else if let Ok(v) = i16::try_from(n) {
            Record::Int16(v)
        } else if (INT24_MIN..=INT24_MAX).contains(&n) {
            Record::Int24(n as i32)
        } else if let Ok(v) = i32::try_from(n) {
            Record::Int32(v)
        } else {
            Record::Int64(n)
        }
    }

    /// Smallest string tier whose length header holds `bytes.len()`
    pub fn from_bytes(bytes: Bytes) -> Result<Self> {
        let len = bytes.len();
        if len <= STR6_MAX_LEN {
            Ok(Record::Str6(bytes))
        } else if len <= STR12_MAX_LEN {
            Ok(Record::Str12(bytes))
        } else if len <= STR32_MAX_LEN {
            Ok(Record::Str32(bytes))
        } else {
            Err(DequeError::ValueTooLarge { len })
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tier(&self) -> Tier {
        match self {
            Record::UInt7(_) => Tier::UInt7,
            Record::Int13(_) => Tier::Int13,
            Record::Int16(_) => Tier::Int16,
            Record::Int24(_) => Tier::Int24,
            Record::Int32(_) => Tier::Int32,
            Record::Int64(_) => Tier::Int64,
            Record::Str6(_) => Tier::Str6,
            Record::Str12(_) => Tier::Str12,
            Record::Str32(_) => Tier::Str32,
        }
    }

    /// Integer value for integer tiers
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Record::UInt7(v) => Some(v as i64),
            Record::Int13(v) | Record::Int16(v) => Some(v as i64),
            Record::Int24(v) | Record::Int32(v) => Some(v as i64),
            Record::Int64(v) => Some(v),
            Record::Str6(_) | Record::Str12(_) | Record::Str32(_) => None,
        }
    }

    /// The element in its original textual/byte form
    pub fn into_value(self) -> Bytes {
        match self {
            Record::Str6(b) | Record::Str12(b) | Record::Str32(b) => b,
            Record::UInt7(v) => Bytes::from(v.to_string()),
            Record::Int13(v) | Record::Int16(v) => Bytes::from(v.to_string()),
            Record::Int24(v) | Record::Int32(v) => Bytes::from(v.to_string()),
            Record::Int64(v) => Bytes::from(v.to_string()),
        }
    }

    /// Tag plus payload, without the back-length trailer
    pub fn record_len(&self) -> usize {
        match self {
            Record::UInt7(_) => 1,
            Record::Int13(_) => 2,
            Record::Int16(_) => 3,
            Record::Int24(_) => 4,
            Record::Int32(_) => 5,
            Record::Int64(_) => 9,
            Record::Str6(b) => 1 + b.len(),
            Record::Str12(b) => 2 + b.len(),
            Record::Str32(b) => 5 + b.len(),
        }
    }

    /// Bytes the record occupies inside a node, trailer included
    pub fn encoded_len(&self) -> usize {
        let len = self.record_len();
        len + backlen_len(len)
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Write tag, payload and back-length trailer into `out`
    ///
    /// `out` must hold at least `encoded_len()` bytes. Returns bytes written.
    pub fn write_to(&self, out: &mut [u8]) -> usize {
        let len = self.record_len();
        match self {
            Record::UInt7(v) => out[0] = *v & !UINT7_MASK,
            Record::Int13(v) => {
                let bits = (*v as u16) & 0x1FFF;
                out[0] = INT13_TAG | (bits >> 8) as u8;
                out[1] = bits as u8;
            }
            Record::Int16(v) => {
                out[0] = INT16_TAG;
                out[1..3].copy_from_slice(&v.to_le_bytes());
            }
            Record::Int24(v) => {
                out[0] = INT24_TAG;
                out[1..4].copy_from_slice(&v.to_le_bytes()[..3]);
            }
            Record::Int32(v) => {
                out[0] = INT32_TAG;
                out[1..5].copy_from_slice(&v.to_le_bytes());
            }
            Record::Int64(v) => {
                out[0] = INT64_TAG;
                out[1..9].copy_from_slice(&v.to_le_bytes());
            }
            Record::Str6(b) => {
                out[0] = STR6_TAG | b.len() as u8;
                out[1..len].copy_from_slice(b);
            }
            Record::Str12(b) => {
                out[0] = STR12_TAG | (b.len() >> 8) as u8;
                out[1] = b.len() as u8;
                out[2..len].copy_from_slice(b);
            }
            Record::Str32(b) => {
                out[0] = STR32_TAG;
                out[1..5].copy_from_slice(&(b.len() as u32).to_le_bytes());
                out[5..len].copy_from_slice(b);
            }
        }
        len + encode_backlen(len, &mut out[len..])
    }

    /// Encoded form as a fresh buffer (trailer included)
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.encoded_len()];
        self.write_to(&mut out);
        out
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    /// Decode the record starting at `buf[0]`
    ///
    /// Returns the record and its length without the trailer.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let tag = *buf
            .first()
            .ok_or_else(|| DequeError::CorruptRecord("empty buffer".to_string()))?;

        if tag & UINT7_MASK == 0 {
            return Ok((Record::UInt7(tag), 1));
        }

        if tag & STR6_MASK == STR6_TAG {
            let len = (tag & !STR6_MASK) as usize;
            let data = take(buf, 1, len)?;
            return Ok((Record::Str6(Bytes::copy_from_slice(data)), 1 + len));
        }

        if tag & INT13_MASK == INT13_TAG {
            let low = take(buf, 1, 1)?[0];
            let bits = (((tag & !INT13_MASK) as u16) << 8) | low as u16;
            // Sign-extend from 13 bits
            let value = ((bits << 3) as i16) >> 3;
            return Ok((Record::Int13(value), 2));
        }

        if tag & STR12_MASK == STR12_TAG {
            let low = take(buf, 1, 1)?[0];
            let len = (((tag & !STR12_MASK) as usize) << 8) | low as usize;
            let data = take(buf, 2, len)?;
            return Ok((Record::Str12(Bytes::copy_from_slice(data)), 2 + len));
        }

        match tag {
            STR32_TAG => {
                let header = take(buf, 1, 4)?;
                let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
                let data = take(buf, 5, len)?;
                Ok((Record::Str32(Bytes::copy_from_slice(data)), 5 + len))
            }
            INT16_TAG => {
                let p = take(buf, 1, 2)?;
                Ok((Record::Int16(i16::from_le_bytes([p[0], p[1]])), 3))
            }
            INT24_TAG => {
                let p = take(buf, 1, 3)?;
                // Place the 24 bits high, then shift back to sign-extend
                let value = i32::from_le_bytes([0, p[0], p[1], p[2]]) >> 8;
                Ok((Record::Int24(value), 4))
            }
            INT32_TAG => {
                let p = take(buf, 1, 4)?;
                Ok((Record::Int32(i32::from_le_bytes([p[0], p[1], p[2], p[3]])), 5))
            }
            INT64_TAG => {
                let p = take(buf, 1, 8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(p);
                Ok((Record::Int64(i64::from_le_bytes(raw)), 9))
            }
            _ => Err(DequeError::CorruptRecord(format!(
                "unknown record tag: 0x{:02x}",
                tag
            ))),
        }
    }
}

/// Slice `len` bytes at `offset`, or report truncation
fn take(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    buf.get(offset..offset + len).ok_or_else(|| {
        DequeError::CorruptRecord(format!(
            "truncated record: need {} bytes, have {}",
            offset + len,
            buf.len()
        ))
    })
}

/// Parse `value` as an i64 only if it is its own canonical decimal form
fn parse_canonical_i64(value: &[u8]) -> Option<i64> {
    if value.is_empty() || value.len() > MAX_INT_LITERAL_LEN {
        return None;
    }

    let digits = value.strip_prefix(b"-").unwrap_or(value);
    let negative = digits.len() != value.len();
    match digits {
        [] => return None,
        [b'0'] if negative => return None,
        [b'0', _, ..] => return None,
        _ => {}
    }
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }

    std::str::from_utf8(value).ok()?.parse::<i64>().ok()
}
