//! Error types for log operations.

use std::io;

use strand_types::CodecError;

/// Result type for log operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur during log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The requested offset is below the lowest or above the highest
    /// offset the log currently holds. Recoverable: a consumer polling
    /// the tail treats this as "wait and retry".
    #[error("offset out of range: {offset}")]
    OffsetOutOfRange { offset: u64 },

    /// An index is full or an entry lies past its end. Internal rollover
    /// signal; the log converts it into a new segment and never returns
    /// it to callers.
    #[error("end of index")]
    EndOfIndex,

    /// The log has been closed; no further operations are possible.
    #[error("log is closed")]
    Closed,

    /// Filesystem I/O error, propagated verbatim.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The record codec rejected a payload read back from the store.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl LogError {
    /// Returns true if this error is the recoverable out-of-range signal.
    pub fn is_offset_out_of_range(&self) -> bool {
        matches!(self, LogError::OffsetOutOfRange { .. })
    }
}
