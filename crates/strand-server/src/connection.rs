//! Per-connection state: buffered reads, frame decode, buffered writes.

use std::io::{self, ErrorKind, Read, Write};
use std::net::SocketAddr;

use bytes::{Buf, BytesMut};
use mio::net::TcpStream;
use tracing::{debug, warn};

use strand_wire::{ErrorCode, Frame, Request, RequestId, Response};

use crate::handler::RequestHandler;

/// A client connection.
///
/// Reads accumulate in `read_buf` until complete frames can be decoded;
/// responses accumulate in `write_buf` and drain as the socket accepts
/// them.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    peer_addr: SocketAddr,
    read_buf: BytesMut,
    write_buf: BytesMut,
    read_chunk: usize,
}

impl Connection {
    /// Wraps an accepted stream.
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, read_chunk: usize) -> Self {
        Self {
            stream,
            peer_addr,
            read_buf: BytesMut::with_capacity(read_chunk),
            write_buf: BytesMut::new(),
            read_chunk,
        }
    }

    /// The underlying stream, for poll registration.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// The peer's address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Drains readable data, dispatching every complete request.
    ///
    /// Returns true if the connection should be dropped.
    pub fn on_readable(&mut self, handler: &RequestHandler) -> bool {
        let mut chunk = vec![0u8; self.read_chunk];

        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    debug!(peer = %self.peer_addr, "peer closed connection");
                    return true;
                }
                Ok(n) => {
                    self.read_buf.extend_from_slice(&chunk[..n]);
                    if self.dispatch_buffered(handler) {
                        return true;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(peer = %self.peer_addr, error = %e, "read error");
                    return true;
                }
            }
        }

        false
    }

    /// Decodes and dispatches every complete frame in the read buffer.
    ///
    /// Returns true if the connection should be dropped.
    fn dispatch_buffered(&mut self, handler: &RequestHandler) -> bool {
        loop {
            match Frame::decode(&mut self.read_buf) {
                Ok(Some(frame)) => {
                    let response = match Request::from_frame(&frame) {
                        Ok(request) => handler.dispatch(request),
                        Err(e) => {
                            warn!(peer = %self.peer_addr, error = %e, "malformed request");
                            Response::error(RequestId::new(0), ErrorCode::InvalidRequest, e.to_string())
                        }
                    };

                    if let Err(e) = self.queue_response(&response) {
                        warn!(peer = %self.peer_addr, error = %e, "failed to queue response");
                        return true;
                    }
                }
                Ok(None) => return false,
                Err(e) => {
                    warn!(peer = %self.peer_addr, error = %e, "frame decode error");
                    return e.is_fatal();
                }
            }
        }
    }

    /// Encodes a response into the write buffer and tries to flush it.
    fn queue_response(&mut self, response: &Response) -> io::Result<()> {
        let frame = response
            .to_frame()
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, e.to_string()))?;
        frame.encode(&mut self.write_buf);
        self.flush()
    }

    /// Attempts to drain the write buffer.
    ///
    /// `WouldBlock` leaves the remainder queued for the next writable
    /// event or poll round.
    pub fn flush(&mut self) -> io::Result<()> {
        while !self.write_buf.is_empty() {
            match self.stream.write(&self.write_buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        ErrorKind::WriteZero,
                        "connection write returned zero",
                    ))
                }
                Ok(n) => self.write_buf.advance(n),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Returns true if there's data waiting to be written.
    pub fn has_pending_writes(&self) -> bool {
        !self.write_buf.is_empty()
    }
}
