//! Client error types.

use thiserror::Error;

use strand_wire::{ErrorCode, WireError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection-level I/O error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Wire protocol error.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// The server reported an error.
    #[error("server error ({code:?}): {message}")]
    Server { code: ErrorCode, message: String },

    /// The server answered with an unexpected payload type.
    #[error("unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse { expected: String, actual: String },

    /// The response's request ID did not match the request.
    #[error("response mismatch: expected request {expected}, received {received}")]
    ResponseMismatch { expected: u64, received: u64 },
}

impl ClientError {
    /// Creates a server error.
    pub fn server(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Returns true if the server rejected the request because the offset
    /// is outside the log's range. Tail consumers treat this as "wait and
    /// retry".
    pub fn is_offset_out_of_range(&self) -> bool {
        matches!(
            self,
            ClientError::Server {
                code: ErrorCode::OffsetOutOfRange,
                ..
            }
        )
    }
}
