//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - LPUSH/RPUSH: key_len (4) + key + count (4) + { value_len (4) + value } * count
//! - LPOP/RPOP/LLEN/DEL: key_len (4) + key
//! - PING: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Command, CommandType, Response, Status};
use crate::error::{DequeError, Result};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Bytes {
    let mut payload = BytesMut::new();

    match command {
        Command::LPush { key, values } | Command::RPush { key, values } => {
            put_chunk(&mut payload, key);
            payload.put_u32(values.len() as u32);
            for value in values {
                put_chunk(&mut payload, value);
            }
        }
        Command::LPop { key }
        | Command::RPop { key }
        | Command::LLen { key }
        | Command::Del { key } => put_chunk(&mut payload, key),
        Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "Command")?;
    parse_command(cmd_type, Bytes::copy_from_slice(payload))
}

fn parse_command(cmd_type: u8, mut payload: Bytes) -> Result<Command> {
    let command_type = match cmd_type {
        0x01 => CommandType::LPush,
        0x02 => CommandType::RPush,
        0x03 => CommandType::LPop,
        0x04 => CommandType::RPop,
        0x05 => CommandType::LLen,
        0x06 => CommandType::Del,
        0x07 => CommandType::Ping,
        _ => {
            return Err(DequeError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                cmd_type
            )))
        }
    };
    let name = command_type.name();

    let command = match command_type {
        CommandType::LPush | CommandType::RPush => {
            let key = take_chunk(&mut payload, name, "key")?.to_vec();
            let values = take_values(&mut payload, name)?;
            if command_type == CommandType::LPush {
                Command::LPush { key, values }
            } else {
                Command::RPush { key, values }
            }
        }
        CommandType::LPop => Command::LPop {
            key: take_chunk(&mut payload, name, "key")?.to_vec(),
        },
        CommandType::RPop => Command::RPop {
            key: take_chunk(&mut payload, name, "key")?.to_vec(),
        },
        CommandType::LLen => Command::LLen {
            key: take_chunk(&mut payload, name, "key")?.to_vec(),
        },
        CommandType::Del => Command::Del {
            key: take_chunk(&mut payload, name, "key")?.to_vec(),
        },
        CommandType::Ping => Command::Ping,
    };

    if payload.has_remaining() {
        return Err(DequeError::Protocol(format!(
            "{} command: unexpected trailing {} bytes",
            name,
            payload.remaining()
        )));
    }

    Ok(command)
}

/// Read the value batch of a push command
fn take_values(payload: &mut Bytes, name: &str) -> Result<Vec<Bytes>> {
    if payload.remaining() < 4 {
        return Err(DequeError::Protocol(format!(
            "{} command: missing value count",
            name
        )));
    }

    let count = payload.get_u32() as usize;
    if count == 0 {
        return Err(DequeError::Protocol(format!(
            "{} command: requires at least one value",
            name
        )));
    }

    // Every value needs at least its 4-byte length
    let mut values = Vec::with_capacity(count.min(payload.remaining() / 4));
    for _ in 0..count {
        values.push(take_chunk(payload, name, "value")?);
    }
    Ok(values)
}

/// Read a length-prefixed chunk
fn take_chunk(payload: &mut Bytes, name: &str, what: &str) -> Result<Bytes> {
    if payload.remaining() < 4 {
        return Err(DequeError::Protocol(format!(
            "{} command: missing {} length",
            name, what
        )));
    }

    let len = payload.get_u32() as usize;
    if payload.remaining() < len {
        return Err(DequeError::Protocol(format!(
            "{} command: incomplete {} (expected {}, got {})",
            name,
            what,
            len,
            payload.remaining()
        )));
    }

    Ok(payload.split_to(len))
}

fn put_chunk(buf: &mut BytesMut, chunk: &[u8]) {
    buf.put_u32(chunk.len() as u32);
    buf.put_slice(chunk);
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Bytes {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "Response")?;
    parse_response(status_byte, Bytes::copy_from_slice(payload))
}

fn parse_response(status_byte: u8, payload: Bytes) -> Result<Response> {
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::Nil,
        0x02 => Status::Error,
        0x03 => Status::Integer,
        _ => {
            return Err(DequeError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    if status == Status::Integer && payload.len() != 8 {
        return Err(DequeError::Protocol(format!(
            "Integer response: expected 8 bytes, got {}",
            payload.len()
        )));
    }

    // An OK response always carries a value, even an empty one
    let payload = if !payload.is_empty() || status == Status::Ok {
        Some(payload)
    } else {
        None
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(code: u8, payload: &[u8]) -> Bytes {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(code);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.freeze()
}

/// Validate a complete in-memory frame, returning its code and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(DequeError::Protocol(format!(
            "{}: incomplete header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let code = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
    check_payload_len(payload_len, what)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(DequeError::Protocol(format!(
            "{}: incomplete payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((code, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: u32, what: &str) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(DequeError::Protocol(format!(
            "{}: payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Read one frame from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<(u8, Bytes)> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    check_payload_len(payload_len, what)?;

    let mut payload = vec![0u8; payload_len as usize];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok((header[0], Bytes::from(payload)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let (cmd_type, payload) = read_frame(reader, "Command")?;
    parse_command(cmd_type, payload)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let (status_byte, payload) = read_frame(reader, "Response")?;
    parse_response(status_byte, payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}
