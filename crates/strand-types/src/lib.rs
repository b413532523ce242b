//! # strand-types: Shared types for `Strand`
//!
//! This crate contains the [`Record`] type exchanged between the storage
//! core and its callers, together with the record codec. The storage core
//! treats record payloads as opaque byte strings; this is the one place
//! that knows how a `{offset, value}` pair becomes bytes and back.
//!
//! # Record Encoding
//!
//! ```text
//! [offset:u64 BE][value:bytes]
//!      8B           variable
//! ```
//!
//! The encoding carries no length or framing of its own: the store file
//! that persists encoded records prefixes each one with its length, and
//! the wire protocol frames its own payloads. `encode` and `decode` are
//! pure and total over valid records.

use bytes::{BufMut, Bytes, BytesMut};

/// Width of the encoded offset field in bytes.
pub const OFFSET_WIDTH: usize = 8;

/// Errors produced by the record codec.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// The input is too short to contain an offset field.
    #[error("truncated record: need at least {OFFSET_WIDTH} bytes, got {0}")]
    Truncated(usize),
}

/// A single record in the log.
///
/// The `offset` is assigned by the log at append time; whatever the caller
/// puts there is overwritten. The `value` is opaque to the storage core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position of this record in the log, assigned on append.
    pub offset: u64,
    /// The record payload.
    pub value: Bytes,
}

impl Record {
    /// Creates a record with the given value and an unassigned offset.
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            offset: 0,
            value: value.into(),
        }
    }

    /// Creates a record with an explicit offset.
    pub fn with_offset(offset: u64, value: impl Into<Bytes>) -> Self {
        Self {
            offset,
            value: value.into(),
        }
    }
}

/// Encodes a record into its byte representation.
pub fn encode(record: &Record) -> Bytes {
    let mut buf = BytesMut::with_capacity(OFFSET_WIDTH + record.value.len());
    buf.put_u64(record.offset);
    buf.put_slice(&record.value);
    buf.freeze()
}

/// Decodes a record from its byte representation.
///
/// The value is the remainder of the input after the offset field; the
/// caller is responsible for handing in exactly one encoded record.
pub fn decode(bytes: &[u8]) -> Result<Record, CodecError> {
    if bytes.len() < OFFSET_WIDTH {
        return Err(CodecError::Truncated(bytes.len()));
    }

    let offset = u64::from_be_bytes(
        bytes[..OFFSET_WIDTH]
            .try_into()
            .expect("slice is exactly OFFSET_WIDTH bytes"),
    );

    Ok(Record {
        offset,
        value: Bytes::copy_from_slice(&bytes[OFFSET_WIDTH..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_produces_offset_then_value() {
        let record = Record::with_offset(42, "hello world");
        let bytes = encode(&record);

        assert_eq!(bytes.len(), OFFSET_WIDTH + 11);
        assert_eq!(u64::from_be_bytes(bytes[..8].try_into().unwrap()), 42);
        assert_eq!(&bytes[8..], b"hello world");
    }

    #[test]
    fn decode_rejects_short_input() {
        assert_eq!(decode(&[0u8; 7]), Err(CodecError::Truncated(7)));
        assert_eq!(decode(&[]), Err(CodecError::Truncated(0)));
    }

    #[test]
    fn empty_value_roundtrips() {
        let record = Record::with_offset(7, Bytes::new());
        let decoded = decode(&encode(&record)).unwrap();

        assert_eq!(decoded.offset, 7);
        assert!(decoded.value.is_empty());
    }

    proptest! {
        #[test]
        fn roundtrip_any_record(
            offset in any::<u64>(),
            value in prop::collection::vec(any::<u8>(), 0..1000),
        ) {
            let record = Record::with_offset(offset, value.clone());
            let decoded = decode(&encode(&record)).unwrap();

            prop_assert_eq!(decoded.offset, offset);
            prop_assert_eq!(decoded.value.as_ref(), value.as_slice());
        }
    }
}
