//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: LPUSH - Payload: key + value batch
//! - 0x02: RPUSH - Payload: key + value batch
//! - 0x03: LPOP  - Payload: key
//! - 0x04: RPOP  - Payload: key
//! - 0x05: LLEN  - Payload: key
//! - 0x06: DEL   - Payload: key
//! - 0x07: PING  - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK      (value bytes)
//! - 0x01: NIL     (nothing to pop)
//! - 0x02: ERROR   (message)
//! - 0x03: INTEGER (i64, big-endian)

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
