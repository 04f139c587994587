//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::protocol::{encode_reply, Reply};

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for EmberKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            engine,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listening socket and return the actual local address
    ///
    /// Useful with port 0. Calling it again returns the existing address.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = self.open_listener()?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    fn open_listener(&self) -> Result<TcpListener> {
        self.config.validate()?;
        Ok(TcpListener::bind(&self.config.listen_addr)?)
    }

    /// Start the server (blocking until shutdown is signalled)
    pub fn run(&mut self) -> Result<()> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => self.open_listener()?,
        };
        let addr = listener.local_addr()?;
        // Non-blocking accept so the shutdown flag is noticed
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", addr);

        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!(
            "Accept loop stopped, {} connection(s) still open",
            self.active_connections()
        );
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    ///
    /// The accept loop stops; open connections finish on their own.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// A flag that stops the server when set, usable from other threads
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    /// Hand an accepted stream to a new worker thread
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping connection from {}: {}", peer, e);
            return;
        }

        let active = self.active_connections.fetch_add(1, Ordering::AcqRel);
        if active >= self.config.max_connections {
            self.active_connections.fetch_sub(1, Ordering::AcqRel);
            tracing::warn!(
                "Rejecting {}: connection limit {} reached",
                peer, self.config.max_connections
            );
            reject(stream, "max number of clients reached");
            return;
        }

        let guard = ActiveGuard(Arc::clone(&self.active_connections));
        let engine = Arc::clone(&self.engine);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("emberkv-conn-{peer}"))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = serve(stream, engine, read_ms, write_ms) {
                    tracing::warn!("Connection {} closed with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn worker for {}: {}", peer, e);
        }
    }
}

/// Run one connection to completion
fn serve(stream: TcpStream, engine: Arc<Engine>, read_ms: u64, write_ms: u64) -> Result<()> {
    let mut connection = Connection::new(stream, engine)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}

/// Best-effort error reply to a client we will not serve
fn reject(mut stream: TcpStream, message: &str) {
    let _ = stream.write_all(&encode_reply(&Reply::error(message)));
}

/// Decrements the active connection count when the worker ends
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
