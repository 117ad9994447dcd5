//! Connection Handler
//!
//! Serves one client socket: frames in, engine replies out.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::engine::{Engine, Reply};
use crate::error::{DequeError, Result};
use crate::protocol::{read_command, write_response, Command, Response};

use super::ShutdownHandle;

/// One accepted client, served until it hangs up or the server stops
pub struct Connection {
    /// Frame source; shares the socket with `writer`
    reader: BufReader<TcpStream>,

    /// Response sink, flushed after every frame
    writer: BufWriter<TcpStream>,

    engine: Arc<Engine>,

    /// Stop flag plus the registry that closes this socket on shutdown
    shutdown: ShutdownHandle,

    /// Registry slot, released on drop
    tracked: u64,

    /// Remote address, only used in log lines
    peer_addr: String,
}

impl Connection {
    /// Wrap an accepted stream and register it with the shutdown handle
    pub fn new(stream: TcpStream, engine: Arc<Engine>, shutdown: ShutdownHandle) -> Result<Self> {
        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => String::from("unknown"),
        };

        // Replies are small and latency bound
        stream.set_nodelay(true)?;

        let tracked = shutdown.track(&stream)?;
        let reader = match stream.try_clone() {
            Ok(read_half) => BufReader::new(read_half),
            Err(e) => {
                shutdown.untrack(tracked);
                return Err(e.into());
            }
        };

        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
            engine,
            shutdown,
            tracked,
            peer_addr,
        })
    }

    /// Apply socket timeouts; zero leaves that direction blocking
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let as_timeout = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));

        self.reader.get_ref().set_read_timeout(as_timeout(read_ms))?;
        self.writer.get_ref().set_write_timeout(as_timeout(write_ms))?;
        Ok(())
    }

    /// Serve frames until the peer leaves, goes idle, or the server stops
    ///
    /// A stop request closes the socket, which surfaces here as a
    /// disconnect, so an idle client cannot hold a worker past shutdown.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Serving {}", self.peer_addr);

        while !self.shutdown.is_shutdown() {
            let command = match self.next_command()? {
                Some(command) => command,
                None => return Ok(()),
            };
            tracing::trace!("{} -> {:?}", self.peer_addr, command);

            let response = self.execute_command(command);
            match write_response(&mut self.writer, &response) {
                Ok(()) => {}
                Err(DequeError::Io(ref e))
                    if is_disconnect(e.kind()) || e.kind() == ErrorKind::BrokenPipe =>
                {
                    tracing::debug!("{} left before its reply was written: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Write to {} failed: {}", self.peer_addr, e);
                    return Err(e);
                }
            }
        }

        tracing::debug!("Dropping {} because the server is stopping", self.peer_addr);
        Ok(())
    }

    /// Read one frame; `None` means the session ended normally
    fn next_command(&mut self) -> Result<Option<Command>> {
        match read_command(&mut self.reader) {
            Ok(command) => Ok(Some(command)),
            Err(DequeError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("{} hung up ({:?})", self.peer_addr, e.kind());
                Ok(None)
            }
            // WouldBlock on unix, TimedOut on windows
            Err(DequeError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                tracing::debug!("{} idle past the read timeout", self.peer_addr);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Bad frame from {}: {}", self.peer_addr, e);
                // Best effort; the socket is about to close anyway
                let _ = write_response(&mut self.writer, &Response::error(&e.to_string()));
                Err(e)
            }
        }
    }

    fn execute_command(&self, command: Command) -> Response {
        match self.engine.execute(command) {
            Ok(Reply::Integer(n)) => Response::integer(n),
            Ok(Reply::Value(value)) => Response::ok(value),
            Ok(Reply::Nil) => Response::nil(),
            Ok(Reply::Pong) => Response::ok(Bytes::from_static(b"PONG")),
            Err(e @ DequeError::CorruptRecord(_)) => {
                tracing::error!("Internal consistency violation serving {}: {}", self.peer_addr, e);
                Response::error(&e.to_string())
            }
            Err(e) => Response::error(&e.to_string()),
        }
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown.untrack(self.tracked);
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected
    )
}
