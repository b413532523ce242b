//! Frame encoding and decoding for the wire protocol.
//!
//! A frame is a fixed 14-byte header followed by the payload:
//! magic (4), version (2), payload length (4), CRC32 of the payload (4).
//! Decoding is incremental so it composes with non-blocking I/O: callers
//! buffer socket reads into a `BytesMut` and call [`Frame::decode`] until
//! it yields a frame.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{WireError, WireResult};

/// Protocol magic bytes: "STRD" in big-endian.
pub const MAGIC: u32 = 0x5354_5244;

/// Current protocol version.
pub const PROTOCOL_VERSION: u16 = 1;

/// Frame header size in bytes (magic + version + length + checksum).
pub const FRAME_HEADER_SIZE: usize = 14;

/// Maximum payload size (16 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// A framed wire payload.
///
/// The header is derived from the payload on encode and checked on
/// decode; it never exists as separate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Creates a frame around a payload.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Returns the encoded size of the frame in bytes.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }

    /// Encodes the frame into a byte buffer.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u32(MAGIC);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32(self.payload.len() as u32);
        buf.put_u32(crc32fast::hash(&self.payload));
        buf.put_slice(&self.payload);
    }

    /// Attempts to decode a frame from a byte buffer.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded,
    /// `Ok(None)` if more bytes are needed, and `Err` if the frame is
    /// invalid. On success, the consumed bytes are removed from the
    /// buffer.
    pub fn decode(buf: &mut BytesMut) -> WireResult<Option<Self>> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        // Peek at the header without consuming, in case the payload has
        // not fully arrived yet.
        let mut peek = &buf[..FRAME_HEADER_SIZE];
        let magic = peek.get_u32();
        let version = peek.get_u16();
        let length = peek.get_u32();
        let checksum = peek.get_u32();

        if magic != MAGIC {
            return Err(WireError::InvalidMagic(magic));
        }
        if version != PROTOCOL_VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }
        if length > MAX_PAYLOAD_SIZE {
            return Err(WireError::PayloadTooLarge {
                size: length,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        if buf.len() < FRAME_HEADER_SIZE + length as usize {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(length as usize).freeze();

        let actual = crc32fast::hash(&payload);
        if actual != checksum {
            return Err(WireError::ChecksumMismatch {
                expected: checksum,
                actual,
            });
        }

        Ok(Some(Self { payload }))
    }
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    fn encode_to_buf(frame: &Frame) -> BytesMut {
        let mut buf = BytesMut::new();
        frame.encode(&mut buf);
        buf
    }

    #[test]
    fn frame_roundtrip() {
        let frame = Frame::new(Bytes::from("hello commit log"));

        let mut buf = encode_to_buf(&frame);
        assert_eq!(buf.len(), frame.encoded_len());

        let decoded = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.payload, frame.payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_header_needs_more_data() {
        let mut buf = BytesMut::from(&[0u8; 5][..]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn incomplete_payload_needs_more_data() {
        let frame = Frame::new(Bytes::from("test"));
        let encoded = encode_to_buf(&frame);

        let mut buf = BytesMut::from(&encoded[..FRAME_HEADER_SIZE + 2]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn invalid_magic_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(0xDEADBEEF);
        buf.put_u16(PROTOCOL_VERSION);
        buf.put_u32(4);
        buf.put_u32(0);
        buf.put_slice(b"test");

        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::InvalidMagic(0xDEADBEEF))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAGIC);
        buf.put_u16(PROTOCOL_VERSION + 1);
        buf.put_u32(4);
        buf.put_u32(0);
        buf.put_slice(b"test");

        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::UnsupportedVersion(2))));
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let frame = Frame::new(Bytes::from("tamper me"));
        let mut buf = encode_to_buf(&frame);

        // Corrupt a payload byte.
        let last = buf.len() - 1;
        buf[last] ^= 0xff;

        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::ChecksumMismatch { .. })));
    }

    #[test]
    fn incremental_decode_one_byte_at_a_time() {
        let frame = Frame::new(Bytes::from("incremental"));
        let encoded = encode_to_buf(&frame);

        let mut buf = BytesMut::new();
        for (i, &byte) in encoded.iter().enumerate() {
            buf.put_u8(byte);
            let result = Frame::decode(&mut buf).unwrap();

            if i < encoded.len() - 1 {
                assert!(result.is_none(), "should not decode until complete");
            } else {
                assert_eq!(result.unwrap().payload, frame.payload);
            }
        }
    }

    #[test]
    fn back_to_back_frames_decode_in_order() {
        let first = Frame::new(Bytes::from("first"));
        let second = Frame::new(Bytes::from("second"));

        let mut buf = BytesMut::new();
        first.encode(&mut buf);
        second.encode(&mut buf);

        assert_eq!(
            Frame::decode(&mut buf).unwrap().unwrap().payload,
            first.payload
        );
        assert_eq!(
            Frame::decode(&mut buf).unwrap().unwrap().payload,
            second.payload
        );
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }
}
