//! # strand-wire: Binary wire protocol for `Strand`
//!
//! This crate defines the binary wire protocol used for client-server
//! communication in `Strand`.
//!
//! ## Frame Format
//!
//! ```text
//! ┌─────────┬─────────┬──────────┬──────────┬──────────────────┐
//! │ Magic   │ Version │ Length   │ Checksum │     Payload      │
//! │ (4 B)   │ (2 B)   │ (4 B)    │ (4 B)    │     (var)        │
//! └─────────┴─────────┴──────────┴──────────┴──────────────────┘
//! ```
//!
//! - **Magic**: `0x53545244` ("STRD")
//! - **Version**: Protocol version (currently 1)
//! - **Length**: Payload length in bytes (max 16 MiB)
//! - **Checksum**: CRC32 of payload
//! - **Payload**: Bincode-encoded message
//!
//! ## Message Types
//!
//! Messages are either requests (client → server) or responses
//! (server → client): produce appends a record and returns its offset,
//! consume reads the record at an offset. Error responses carry a code;
//! `ErrorCode::OffsetOutOfRange` is distinguished so consumers can poll
//! the log's tail.

mod error;
mod frame;
mod message;

pub use error::{WireError, WireResult};
pub use frame::{Frame, FRAME_HEADER_SIZE, MAGIC, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};
pub use message::{
    ConsumeRequest, ConsumeResponse, ErrorCode, ErrorResponse, ProduceRequest, ProduceResponse,
    Request, RequestId, RequestPayload, Response, ResponsePayload,
};
