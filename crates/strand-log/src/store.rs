//! Byte-addressed append-only store file.
//!
//! A store is the data half of a segment: a flat file of length-prefixed
//! entries, addressed by byte position.
//!
//! # Entry Format
//!
//! ```text
//! [len:u64 BE][payload:len bytes]
//!     8B           variable
//! ```
//!
//! `len` does not include itself. The file grows only by append. Writes go
//! through a buffered writer; `size` always reflects bytes handed to the
//! buffer, so readers flush before reading to see their own writes. No
//! fsync happens on append; durability is at the filesystem's discretion
//! until close.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

/// Width of the length prefix in bytes.
pub const LEN_WIDTH: u64 = 8;

/// A position-addressed append-only byte log.
///
/// All operations serialize on an internal mutex; the store hands out
/// positions under that mutex, so appends never interleave.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Read handle onto the same file description as the writer.
    reader: File,
    writer: BufWriter<File>,
    /// Total bytes written, including any still in the write buffer.
    size: u64,
}

impl Store {
    /// Wraps an open file (read/write/append) in a store.
    ///
    /// The current file length becomes the initial `size`, which is how a
    /// store recovers its write position on reopen.
    pub fn open(file: File) -> io::Result<Self> {
        let size = file.metadata()?.len();
        let reader = file.try_clone()?;

        Ok(Self {
            inner: Mutex::new(StoreInner {
                reader,
                writer: BufWriter::new(file),
                size,
            }),
        })
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("store lock poisoned"))
    }

    /// Appends a length-prefixed entry.
    ///
    /// Returns the total bytes written (prefix included) and the position
    /// the entry starts at.
    pub fn append(&self, bytes: &[u8]) -> io::Result<(u64, u64)> {
        let mut inner = self.lock()?;

        let position = inner.size;
        inner.writer.write_all(&(bytes.len() as u64).to_be_bytes())?;
        inner.writer.write_all(bytes)?;

        let written = LEN_WIDTH + bytes.len() as u64;
        inner.size += written;

        Ok((written, position))
    }

    /// Reads the entry starting at `position`.
    pub fn read(&self, position: u64) -> io::Result<Bytes> {
        let mut inner = self.lock()?;
        inner.writer.flush()?;

        let mut len_buf = [0u8; LEN_WIDTH as usize];
        inner.reader.read_exact_at(&mut len_buf, position)?;
        let len = u64::from_be_bytes(len_buf);

        let mut payload = vec![0u8; len as usize];
        inner.reader.read_exact_at(&mut payload, position + LEN_WIDTH)?;

        Ok(Bytes::from(payload))
    }

    /// Performs a positioned read of up to `dst.len()` bytes at `offset`,
    /// without interpreting entry framing.
    ///
    /// Returns the number of bytes read; zero means end of file.
    pub fn read_at(&self, dst: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut inner = self.lock()?;
        inner.writer.flush()?;
        inner.reader.read_at(dst, offset)
    }

    /// Returns the current size in bytes, buffered writes included.
    pub fn size(&self) -> io::Result<u64> {
        Ok(self.lock()?.size)
    }

    /// Flushes buffered writes. The file handle itself is released when
    /// the store (and any raw readers holding it) drop.
    pub fn close(&self) -> io::Result<()> {
        self.lock()?.writer.flush()
    }
}
