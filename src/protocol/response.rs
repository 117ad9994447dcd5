//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Nil = 0x01,
    Error = 0x02,
    Integer = 0x03,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (popped value, error message, or big-endian i64)
    pub payload: Option<Bytes>,
}

impl Response {
    /// Create an OK response carrying a value
    pub fn ok(value: Bytes) -> Self {
        Self {
            status: Status::Ok,
            payload: Some(value),
        }
    }

    /// Create a NIL response (nothing to pop)
    pub fn nil() -> Self {
        Self {
            status: Status::Nil,
            payload: None,
        }
    }

    /// Create an INTEGER response
    pub fn integer(value: i64) -> Self {
        Self {
            status: Status::Integer,
            payload: Some(Bytes::copy_from_slice(&value.to_be_bytes())),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(Bytes::copy_from_slice(message.as_bytes())),
        }
    }

    /// Integer carried by an INTEGER response
    pub fn as_integer(&self) -> Option<i64> {
        if self.status != Status::Integer {
            return None;
        }
        let payload = self.payload.as_ref()?;
        let raw: [u8; 8] = payload.as_ref().try_into().ok()?;
        Some(i64::from_be_bytes(raw))
    }

    /// Message carried by an ERROR response
    pub fn error_message(&self) -> Option<String> {
        if self.status != Status::Error {
            return None;
        }
        let payload = self.payload.as_ref()?;
        Some(String::from_utf8_lossy(payload).into_owned())
    }
}
