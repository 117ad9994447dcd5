//! Element Codec Module
//!
//! Encodes deque elements into the smallest tagged binary record that holds
//! them losslessly, and decodes records back to their original bytes.
//!
//! ## Responsibilities
//! - Classify a value as a canonical 64-bit integer literal or raw bytes
//! - Pick the smallest integer or string tier (bounds inclusive)
//! - Write/read the back-length trailer used for backward traversal
//!
//! ## Record Layout
//! ```text
//! 0xxxxxxx                         7-bit uint     0 … 127
//! 10xxxxxx <data>                  6-bit string   len 0 … 63
//! 110xxxxx yyyyyyyy                13-bit int     -4096 … 4095
//! 1110xxxx yyyyyyyy <data>         12-bit string  len 64 … 4095
//! 11110000 <u32 LE len> <data>     32-bit string  len 4096 … u32::MAX
//! 11110001 <i16 LE>                16-bit int
//! 11110010 <i24 LE>                24-bit int
//! 11110011 <i32 LE>                32-bit int
//! 11110100 <i64 LE>                64-bit int
//! ```
//!
//! ## Entry Layout Inside a Node
//! ```text
//! ┌──────────────────────────┬────────────────────┐
//! │ Record (tag + payload)   │ Back-length (1..5) │
//! └──────────────────────────┴────────────────────┘
//! ```

mod backlen;
mod record;

pub use backlen::{backlen_len, decode_backlen, encode_backlen, MAX_BACKLEN_SIZE};
pub use record::{Record, Tier};
