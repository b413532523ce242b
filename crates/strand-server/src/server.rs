//! The poll-based TCP server loop.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use strand_log::CommitLog;

use crate::config::ServerConfig;
use crate::connection::Connection;
use crate::error::ServerResult;
use crate::handler::RequestHandler;

/// Token for the listener socket.
const LISTENER_TOKEN: Token = Token(0);

/// First token handed to client connections.
const CONNECTION_TOKEN_BASE: usize = 1;

/// Maximum number of events to process per poll iteration.
const MAX_EVENTS: usize = 128;

/// Poll timeout for the run loop; bounds how long pending writes wait for
/// another flush attempt.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Synchronous TCP server exposing produce/consume over the log.
///
/// Uses mio for non-blocking I/O with a poll-based event loop; there is no
/// async runtime. All log operations execute on the server thread.
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    local_addr: SocketAddr,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    handler: RequestHandler,
    read_buffer_size: usize,
}

impl Server {
    /// Binds the listener and prepares the event loop.
    pub fn new(config: ServerConfig, log: Arc<dyn CommitLog>) -> ServerResult<Self> {
        let poll = Poll::new()?;

        let mut listener = TcpListener::bind(config.bind_addr)?;
        let local_addr = listener.local_addr()?;
        poll.registry()
            .register(&mut listener, LISTENER_TOKEN, Interest::READABLE)?;

        info!(addr = %local_addr, "server listening");

        Ok(Self {
            poll,
            listener,
            local_addr,
            connections: HashMap::new(),
            next_token: CONNECTION_TOKEN_BASE,
            handler: RequestHandler::new(log),
            read_buffer_size: config.read_buffer_size,
        })
    }

    /// Returns the bound address (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Runs the event loop until an unrecoverable error occurs.
    pub fn run(&mut self) -> ServerResult<()> {
        loop {
            self.poll(Some(POLL_INTERVAL))?;
        }
    }

    /// Processes one batch of events.
    ///
    /// Exposed so callers can drive the loop themselves (tests, embedders
    /// with their own shutdown signal).
    pub fn poll(&mut self, timeout: Option<Duration>) -> ServerResult<()> {
        let mut events = Events::with_capacity(MAX_EVENTS);
        self.poll.poll(&mut events, timeout)?;

        for event in events.iter() {
            match event.token() {
                LISTENER_TOKEN => self.accept_connections()?,
                token => {
                    let mut remove = false;
                    if let Some(connection) = self.connections.get_mut(&token) {
                        if event.is_readable() {
                            remove = connection.on_readable(&self.handler);
                        }
                        if !remove && event.is_writable() {
                            if let Err(e) = connection.flush() {
                                warn!(peer = %connection.peer_addr(), error = %e, "write error");
                                remove = true;
                            }
                        }
                    }
                    if remove {
                        self.drop_connection(token);
                    }
                }
            }
        }

        // Retry pending writes so a WouldBlock response is not stranded
        // until the peer next sends data.
        let mut stale = Vec::new();
        for (&token, connection) in &mut self.connections {
            if connection.has_pending_writes() {
                if let Err(e) = connection.flush() {
                    warn!(peer = %connection.peer_addr(), error = %e, "write error");
                    stale.push(token);
                }
            }
        }
        for token in stale {
            self.drop_connection(token);
        }

        Ok(())
    }

    /// Accepts pending inbound connections.
    fn accept_connections(&mut self) -> ServerResult<()> {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    debug!(peer = %addr, "accepted connection");

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    self.poll.registry().register(
                        &mut stream,
                        token,
                        Interest::READABLE | Interest::WRITABLE,
                    )?;

                    self.connections
                        .insert(token, Connection::new(stream, addr, self.read_buffer_size));
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    fn drop_connection(&mut self, token: Token) {
        if let Some(mut connection) = self.connections.remove(&token) {
            debug!(peer = %connection.peer_addr(), "dropping connection");
            let _ = self.poll.registry().deregister(connection.stream_mut());
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.local_addr)
            .field("connections", &self.connections.len())
            .finish_non_exhaustive()
    }
}
