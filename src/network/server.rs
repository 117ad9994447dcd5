//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};
use parking_lot::Mutex;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{DequeError, Result};
use crate::protocol::{write_response, Response};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Default)]
struct ShutdownState {
    stopping: AtomicBool,
    next_id: AtomicU64,
    /// Streams currently served by a worker, closed on shutdown
    live: Mutex<HashMap<u64, TcpStream>>,
}

/// Cloneable flag that asks a running server to stop
///
/// Stopping also closes every tracked client socket, so a worker blocked
/// on an idle client wakes up even with no read timeout configured.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<ShutdownState>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.stopping.store(true, Ordering::Release);
        for stream in self.0.live.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.stopping.load(Ordering::Acquire)
    }

    /// Register a served stream; the returned id releases it via `untrack`
    pub(crate) fn track(&self, stream: &TcpStream) -> Result<u64> {
        let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
        let mut live = self.0.live.lock();
        let handle = stream.try_clone()?;
        // A stop that raced ahead of registration must still close it
        if self.is_shutdown() {
            let _ = handle.shutdown(Shutdown::Both);
        }
        live.insert(id, handle);
        Ok(id)
    }

    pub(crate) fn untrack(&self, id: u64) {
        self.0.live.lock().remove(&id);
    }

    /// Number of streams still registered
    pub fn live_connections(&self) -> usize {
        self.0.live.lock().len()
    }
}

/// TCP server for PackDeque
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Bind the listen address without serving yet
    ///
    /// Useful with port 0: the returned address is the one actually bound.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            DequeError::Network(format!("Failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Binds first if `bind()` was not called.
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(DequeError::Network("Listener not bound".to_string())),
        };
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = self.spawn_workers(&rx)?;
        drop(rx);

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    match tx.try_send(stream) {
                        Ok(()) => tracing::trace!("Queued connection from {}", addr),
                        Err(TrySendError::Full(mut stream)) => {
                            tracing::warn!("Connection limit reached, rejecting {}", addr);
                            let _ = write_response(&mut stream, &Response::error("server busy"));
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            tracing::error!("All workers exited, stopping acceptor");
                            break;
                        }
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        // Closing the channel lets idle workers exit once the queue drains
        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Connection worker panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// A handle that can stop the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    fn spawn_workers(&self, rx: &Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        (0..self.config.worker_threads)
            .map(|i| {
                let rx = rx.clone();
                let engine = Arc::clone(&self.engine);
                let shutdown = self.shutdown.clone();
                let timeouts = (self.config.read_timeout_ms, self.config.write_timeout_ms);
                thread::Builder::new()
                    .name(format!("packdeque-worker-{}", i))
                    .spawn(move || worker_loop(rx, engine, shutdown, timeouts))
                    .map_err(DequeError::from)
            })
            .collect()
    }
}

/// Serve queued connections one at a time until the channel closes
fn worker_loop(
    rx: Receiver<TcpStream>,
    engine: Arc<Engine>,
    shutdown: ShutdownHandle,
    (read_ms, write_ms): (u64, u64),
) {
    for stream in rx.iter() {
        let mut connection = match Connection::new(stream, Arc::clone(&engine), shutdown.clone()) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                continue;
            }
        };

        if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
            tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
            continue;
        }

        if let Err(e) = connection.handle() {
            tracing::debug!("Connection {} closed with error: {}", connection.peer_addr(), e);
        }
    }
}
