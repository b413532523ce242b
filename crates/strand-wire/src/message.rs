//! Request and response message types for the wire protocol.
//!
//! Messages are serialized using bincode for efficient binary encoding.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{WireError, WireResult};
use crate::frame::Frame;

/// Unique identifier for a request, used to match responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Creates a new request ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// A client request to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique request identifier.
    pub id: RequestId,
    /// The request payload.
    pub payload: RequestPayload,
}

impl Request {
    /// Creates a new request.
    pub fn new(id: RequestId, payload: RequestPayload) -> Self {
        Self { id, payload }
    }

    /// Encodes the request to a frame.
    pub fn to_frame(&self) -> WireResult<Frame> {
        let payload =
            bincode::serialize(self).map_err(|e| WireError::Serialization(e.to_string()))?;
        Ok(Frame::new(Bytes::from(payload)))
    }

    /// Decodes a request from a frame.
    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        bincode::deserialize(&frame.payload).map_err(WireError::from)
    }
}

/// Request payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestPayload {
    /// Append a record to the log.
    Produce(ProduceRequest),
    /// Read the record at an offset.
    Consume(ConsumeRequest),
}

/// Produce request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceRequest {
    /// The record payload to append.
    pub value: Vec<u8>,
}

/// Consume request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeRequest {
    /// Offset of the record to read.
    pub offset: u64,
}

// ============================================================================
// Response Types
// ============================================================================

/// A server response to a client request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Request ID this is responding to.
    pub request_id: RequestId,
    /// The response payload.
    pub payload: ResponsePayload,
}

impl Response {
    /// Creates a new response.
    pub fn new(request_id: RequestId, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Creates an error response.
    pub fn error(request_id: RequestId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            request_id,
            payload: ResponsePayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        }
    }

    /// Encodes the response to a frame.
    pub fn to_frame(&self) -> WireResult<Frame> {
        let payload =
            bincode::serialize(self).map_err(|e| WireError::Serialization(e.to_string()))?;
        Ok(Frame::new(Bytes::from(payload)))
    }

    /// Decodes a response from a frame.
    pub fn from_frame(frame: &Frame) -> WireResult<Self> {
        bincode::deserialize(&frame.payload).map_err(WireError::from)
    }
}

/// Response payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// Error response.
    Error(ErrorResponse),
    /// Produce response.
    Produce(ProduceResponse),
    /// Consume response.
    Consume(ConsumeResponse),
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

/// Error codes for wire protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    /// Unknown error.
    Unknown = 0,
    /// Internal server error.
    Internal = 1,
    /// Invalid request format.
    InvalidRequest = 2,
    /// The requested offset is outside the log's range. Consumers polling
    /// the tail treat this as "wait and retry".
    OffsetOutOfRange = 3,
    /// Storage error.
    Storage = 4,
}

/// Produce response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProduceResponse {
    /// Offset assigned to the appended record.
    pub offset: u64,
}

/// Consume response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumeResponse {
    /// Offset of the record.
    pub offset: u64,
    /// The record payload.
    pub value: Vec<u8>,
}

#[cfg(test)]
mod message_tests {
    use super::*;

    #[test]
    fn request_roundtrip() {
        let request = Request::new(
            RequestId::new(1),
            RequestPayload::Produce(ProduceRequest {
                value: b"hello world".to_vec(),
            }),
        );

        let frame = request.to_frame().unwrap();
        let decoded = Request::from_frame(&frame).unwrap();

        assert_eq!(decoded.id, request.id);
        match decoded.payload {
            RequestPayload::Produce(p) => assert_eq!(p.value, b"hello world"),
            other => panic!("expected produce payload, got {other:?}"),
        }
    }

    #[test]
    fn response_roundtrip() {
        let response = Response::new(
            RequestId::new(7),
            ResponsePayload::Consume(ConsumeResponse {
                offset: 3,
                value: b"hello world".to_vec(),
            }),
        );

        let frame = response.to_frame().unwrap();
        let decoded = Response::from_frame(&frame).unwrap();

        assert_eq!(decoded.request_id, response.request_id);
        match decoded.payload {
            ResponsePayload::Consume(c) => {
                assert_eq!(c.offset, 3);
                assert_eq!(c.value, b"hello world");
            }
            other => panic!("expected consume payload, got {other:?}"),
        }
    }

    #[test]
    fn error_response_carries_code_and_message() {
        let response = Response::error(
            RequestId::new(1),
            ErrorCode::OffsetOutOfRange,
            "offset out of range: 42",
        );

        let frame = response.to_frame().unwrap();
        let decoded = Response::from_frame(&frame).unwrap();

        if let ResponsePayload::Error(err) = decoded.payload {
            assert_eq!(err.code, ErrorCode::OffsetOutOfRange);
            assert_eq!(err.message, "offset out of range: 42");
        } else {
            panic!("expected error payload");
        }
    }
}
