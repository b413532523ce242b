//! RPC client for `Strand`.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::BytesMut;

use strand_wire::{
    ConsumeRequest, ConsumeResponse, Frame, ProduceRequest, Request, RequestId, RequestPayload,
    Response, ResponsePayload,
};

use crate::error::{ClientError, ClientResult};

/// Configuration for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read timeout.
    pub read_timeout: Option<Duration>,
    /// Write timeout.
    pub write_timeout: Option<Duration>,
    /// Buffer size for reads.
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
            buffer_size: 64 * 1024,
        }
    }
}

/// RPC client for `Strand`.
///
/// This client uses synchronous I/O to communicate with a `Strand` server
/// using the binary wire protocol.
///
/// # Example
///
/// ```ignore
/// use strand_client::{Client, ClientConfig};
///
/// let mut client = Client::connect("127.0.0.1:7070", ClientConfig::default())?;
///
/// let offset = client.produce(b"hello world".to_vec())?;
/// let record = client.consume(offset)?;
/// assert_eq!(record.value, b"hello world");
/// ```
pub struct Client {
    stream: TcpStream,
    next_request_id: u64,
    read_buf: BytesMut,
    config: ClientConfig,
}

impl Client {
    /// Connects to a `Strand` server.
    pub fn connect(addr: impl ToSocketAddrs, config: ClientConfig) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        Ok(Self {
            stream,
            next_request_id: 1,
            read_buf: BytesMut::with_capacity(config.buffer_size),
            config,
        })
    }

    /// Appends a record to the log.
    ///
    /// Returns the offset assigned to the record.
    pub fn produce(&mut self, value: Vec<u8>) -> ClientResult<u64> {
        let response = self.send_request(RequestPayload::Produce(ProduceRequest { value }))?;

        match response.payload {
            ResponsePayload::Produce(p) => Ok(p.offset),
            ResponsePayload::Error(e) => Err(ClientError::server(e.code, e.message)),
            other => Err(ClientError::UnexpectedResponse {
                expected: "Produce".to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }

    /// Reads the record stored at the given offset.
    pub fn consume(&mut self, offset: u64) -> ClientResult<ConsumeResponse> {
        let response = self.send_request(RequestPayload::Consume(ConsumeRequest { offset }))?;

        match response.payload {
            ResponsePayload::Consume(c) => Ok(c),
            ResponsePayload::Error(e) => Err(ClientError::server(e.code, e.message)),
            other => Err(ClientError::UnexpectedResponse {
                expected: "Consume".to_string(),
                actual: format!("{other:?}"),
            }),
        }
    }

    /// Sends a request and waits for the response.
    fn send_request(&mut self, payload: RequestPayload) -> ClientResult<Response> {
        let request_id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        let request = Request::new(request_id, payload);

        let frame = request.to_frame()?;
        let mut write_buf = BytesMut::new();
        frame.encode(&mut write_buf);
        self.stream.write_all(&write_buf)?;
        self.stream.flush()?;

        let response = self.read_response()?;

        if response.request_id.0 != request_id.0 {
            return Err(ClientError::ResponseMismatch {
                expected: request_id.0,
                received: response.request_id.0,
            });
        }

        Ok(response)
    }

    /// Reads a response from the server.
    fn read_response(&mut self) -> ClientResult<Response> {
        loop {
            if let Some(frame) = Frame::decode(&mut self.read_buf)? {
                let response = Response::from_frame(&frame)?;
                return Ok(response);
            }

            // Need more data
            let mut temp_buf = [0u8; 4096];
            let n = self.stream.read(&mut temp_buf)?;
            if n == 0 {
                return Err(ClientError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "server closed connection",
                )));
            }
            self.read_buf.extend_from_slice(&temp_buf[..n]);

            if self.read_buf.len() > self.config.buffer_size * 2 {
                return Err(ClientError::Connection(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "response too large",
                )));
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("next_request_id", &self.next_request_id)
            .finish_non_exhaustive()
    }
}
