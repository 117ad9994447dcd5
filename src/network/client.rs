//! TCP Client
//!
//! Blocking client speaking the binary protocol, one request at a time.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{DequeError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// A connection to a PackDeque server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| DequeError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send a command and wait for its response
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    // =========================================================================
    // Typed Commands
    // =========================================================================

    pub fn lpush<V: AsRef<[u8]>>(&mut self, key: &[u8], values: &[V]) -> Result<i64> {
        let command = Command::LPush {
            key: key.to_vec(),
            values: to_bytes(values),
        };
        expect_integer(self.send(&command)?)
    }

    pub fn rpush<V: AsRef<[u8]>>(&mut self, key: &[u8], values: &[V]) -> Result<i64> {
        let command = Command::RPush {
            key: key.to_vec(),
            values: to_bytes(values),
        };
        expect_integer(self.send(&command)?)
    }

    pub fn lpop(&mut self, key: &[u8]) -> Result<Option<Bytes>> {
        expect_value(self.send(&Command::LPop { key: key.to_vec() })?)
    }

    pub fn rpop(&mut self, key: &[u8]) -> Result<Option<Bytes>> {
        expect_value(self.send(&Command::RPop { key: key.to_vec() })?)
    }

    pub fn llen(&mut self, key: &[u8]) -> Result<i64> {
        expect_integer(self.send(&Command::LLen { key: key.to_vec() })?)
    }

    /// Delete a key; returns whether it existed
    pub fn del(&mut self, key: &[u8]) -> Result<bool> {
        expect_integer(self.send(&Command::Del { key: key.to_vec() })?).map(|n| n > 0)
    }

    pub fn ping(&mut self) -> Result<()> {
        match expect_value(self.send(&Command::Ping)?)? {
            Some(pong) if &pong[..] == b"PONG" => Ok(()),
            other => Err(DequeError::Protocol(format!("Unexpected PING reply: {:?}", other))),
        }
    }
}

fn to_bytes<V: AsRef<[u8]>>(values: &[V]) -> Vec<Bytes> {
    values
        .iter()
        .map(|v| Bytes::copy_from_slice(v.as_ref()))
        .collect()
}

fn expect_integer(response: Response) -> Result<i64> {
    if let Some(message) = response.error_message() {
        return Err(DequeError::Protocol(message));
    }
    response.as_integer().ok_or_else(|| {
        DequeError::Protocol(format!("Expected integer reply, got {:?}", response.status))
    })
}

fn expect_value(response: Response) -> Result<Option<Bytes>> {
    match response.status {
        Status::Ok => Ok(Some(response.payload.unwrap_or_default())),
        Status::Nil => Ok(None),
        Status::Error => Err(DequeError::Protocol(
            response.error_message().unwrap_or_default(),
        )),
        Status::Integer => Err(DequeError::Protocol(
            "Expected value reply, got integer".to_string(),
        )),
    }
}
