//! Memory-mapped offset index.
//!
//! The index is the lookup half of a segment: a dense table mapping a
//! record's offset (relative to the segment's base) to its byte position
//! in the store file.
//!
//! # Entry Format
//!
//! ```text
//! [rel_off:u32 BE][pos:u64 BE]
//!       4B            8B
//! ```
//!
//! On open the file is grown to `max_index_bytes` and mapped read/write
//! shared over that whole region; the mapping is the only access path.
//! On close the mapping is synced and the file is truncated back to the
//! logical entry region. That trailing truncate matters: on reopen, the
//! file's physical length is what tells the index how many entries it
//! holds, because the mapping itself is reset to `max_index_bytes`.
//!
//! The stored `rel_off` always equals the entry's own position in the
//! table. The redundancy is kept so a `read(-1)` lookup of the last entry
//! is a single mapped read, and because the on-disk format is a
//! compatibility surface.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use memmap2::MmapMut;

use crate::error::{LogError, LogResult};

/// Width of the relative-offset column in bytes.
pub const OFF_WIDTH: u64 = 4;
/// Width of the position column in bytes.
pub const POS_WIDTH: u64 = 8;
/// Width of one index entry in bytes.
pub const ENTRY_WIDTH: u64 = OFF_WIDTH + POS_WIDTH;

/// Fixed-width offset → position table backed by a shared memory mapping.
///
/// The index carries no internal lock: the log's writer lock serializes
/// writes, and readers only observe committed bytes in `[0, size)`.
#[derive(Debug)]
pub struct Index {
    file: File,
    map: MmapMut,
    /// Bytes of committed entries; always a multiple of [`ENTRY_WIDTH`].
    size: u64,
}

impl Index {
    /// Opens (or creates) the index file at `path`.
    ///
    /// Captures the file's current length as the logical entry region,
    /// then grows the file to `max_index_bytes` and maps it.
    pub fn open(path: &Path, max_index_bytes: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let size = file.metadata()?.len();
        file.set_len(max_index_bytes)?;

        // SAFETY: the file stays open for the lifetime of the mapping and
        // is only resized again after the mapping is dropped on close.
        // The segment directory is exclusive to one log instance.
        let map = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self { file, map, size })
    }

    /// Reads the entry at `at`, or the last entry when `at == -1`.
    ///
    /// Returns the stored relative offset and store position. Fails with
    /// [`LogError::EndOfIndex`] when the index is empty or `at` lies past
    /// the committed entries.
    pub fn read(&self, at: i64) -> LogResult<(u32, u64)> {
        if self.size == 0 {
            return Err(LogError::EndOfIndex);
        }

        let entry = if at == -1 {
            (self.size / ENTRY_WIDTH) - 1
        } else {
            u64::try_from(at).map_err(|_| LogError::EndOfIndex)?
        };

        let start = entry
            .checked_mul(ENTRY_WIDTH)
            .ok_or(LogError::EndOfIndex)?;
        let end = start.checked_add(ENTRY_WIDTH).ok_or(LogError::EndOfIndex)?;
        if self.size < end {
            return Err(LogError::EndOfIndex);
        }

        let start = start as usize;
        let rel_off = u32::from_be_bytes(
            self.map[start..start + OFF_WIDTH as usize]
                .try_into()
                .expect("slice is exactly OFF_WIDTH bytes"),
        );
        let pos = u64::from_be_bytes(
            self.map[start + OFF_WIDTH as usize..start + ENTRY_WIDTH as usize]
                .try_into()
                .expect("slice is exactly POS_WIDTH bytes"),
        );

        Ok((rel_off, pos))
    }

    /// Appends an entry to the index.
    ///
    /// Fails with [`LogError::EndOfIndex`] when the mapped region has no
    /// room left, which is the signal for the log to roll a new segment.
    pub fn write(&mut self, rel_off: u32, pos: u64) -> LogResult<()> {
        if (self.map.len() as u64) < self.size + ENTRY_WIDTH {
            return Err(LogError::EndOfIndex);
        }

        let start = self.size as usize;
        self.map[start..start + OFF_WIDTH as usize].copy_from_slice(&rel_off.to_be_bytes());
        self.map[start + OFF_WIDTH as usize..start + ENTRY_WIDTH as usize]
            .copy_from_slice(&pos.to_be_bytes());
        self.size += ENTRY_WIDTH;

        Ok(())
    }

    /// Returns the size of the committed entry region in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Syncs the mapping and file, then trims the reserved tail so the
    /// on-disk length equals the committed entry region.
    pub fn close(self) -> io::Result<()> {
        self.map.flush()?;
        self.file.sync_all()?;

        let Index { file, map, size } = self;
        // The mapping must be gone before the file shrinks under it.
        drop(map);
        file.set_len(size)?;

        Ok(())
    }
}
