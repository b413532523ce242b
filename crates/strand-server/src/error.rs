//! Server error types.

use thiserror::Error;

use strand_log::LogError;
use strand_wire::WireError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket or poll I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire protocol error.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Storage error.
    #[error("log error: {0}")]
    Log(#[from] LogError),
}
