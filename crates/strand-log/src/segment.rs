//! Log segment: one store/index pair owning a contiguous offset range.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strand_types::Record;

use crate::config::SegmentConfig;
use crate::error::{LogError, LogResult};
use crate::index::Index;
use crate::store::Store;

/// Extension of segment store files.
const STORE_SUFFIX: &str = "store";
/// Extension of segment index files.
const INDEX_SUFFIX: &str = "index";

/// A segment of the log, covering the offset range `[base, next)`.
///
/// The segment owns `{dir}/{base_offset}.store` and
/// `{dir}/{base_offset}.index`. Its `next_offset` is recovered on open
/// from the index's last entry, which is why the index file must be
/// trimmed to its entry region on clean close.
#[derive(Debug)]
pub struct Segment {
    store: Arc<Store>,
    index: Index,
    store_path: PathBuf,
    index_path: PathBuf,
    base_offset: u64,
    next_offset: u64,
    /// Mirror of the store's size; only this segment appends to it.
    store_size: u64,
    config: SegmentConfig,
}

impl Segment {
    /// Opens (or creates) the segment with the given base offset.
    pub fn open(dir: &Path, base_offset: u64, config: SegmentConfig) -> LogResult<Self> {
        let store_path = dir.join(format!("{base_offset}.{STORE_SUFFIX}"));
        let index_path = dir.join(format!("{base_offset}.{INDEX_SUFFIX}"));

        let store_file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&store_path)?;
        let store = Arc::new(Store::open(store_file)?);
        let store_size = store.size()?;

        let index = Index::open(&index_path, config.max_index_bytes)?;

        let next_offset = match index.read(-1) {
            Ok((rel, _)) => base_offset + u64::from(rel) + 1,
            Err(LogError::EndOfIndex) => base_offset,
            Err(e) => return Err(e),
        };

        Ok(Self {
            store,
            index,
            store_path,
            index_path,
            base_offset,
            next_offset,
            store_size,
            config,
        })
    }

    /// Appends a record, assigning it the segment's next offset.
    ///
    /// Returns the assigned absolute offset. Fails with
    /// [`LogError::EndOfIndex`] if the index is full.
    pub fn append(&mut self, mut record: Record) -> LogResult<u64> {
        let offset = self.next_offset;
        record.offset = offset;

        let encoded = strand_types::encode(&record);
        let (written, pos) = self.store.append(&encoded)?;

        self.index
            .write((offset - self.base_offset) as u32, pos)?;

        self.store_size += written;
        self.next_offset += 1;

        Ok(offset)
    }

    /// Reads the record stored at the given absolute offset.
    pub fn read(&self, offset: u64) -> LogResult<Record> {
        let rel = offset
            .checked_sub(self.base_offset)
            .and_then(|rel| i64::try_from(rel).ok())
            .ok_or(LogError::EndOfIndex)?;

        let (_, pos) = self.index.read(rel)?;
        let bytes = self.store.read(pos)?;

        Ok(strand_types::decode(&bytes)?)
    }

    /// Returns true if either the store or the index has reached its cap.
    /// Either condition triggers a rollover in the log.
    pub fn is_maxed(&self) -> bool {
        self.store_size >= self.config.max_store_bytes
            || self.index.size() >= self.config.max_index_bytes
    }

    /// Returns the absolute offset of the segment's first record.
    pub fn base_offset(&self) -> u64 {
        self.base_offset
    }

    /// Returns the absolute offset the next append will receive.
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    /// Returns true if `offset` falls within `[base, next)`.
    pub fn contains(&self, offset: u64) -> bool {
        self.base_offset <= offset && offset < self.next_offset
    }

    /// Shared handle to the segment's store, for raw log readers.
    pub(crate) fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Closes the index (sync + trim) and then the store.
    pub fn close(self) -> LogResult<()> {
        self.index.close()?;
        self.store.close()?;
        Ok(())
    }

    /// Closes the segment and deletes both files.
    pub fn remove(self) -> LogResult<()> {
        let store_path = self.store_path.clone();
        let index_path = self.index_path.clone();

        self.close()?;
        fs::remove_file(index_path)?;
        fs::remove_file(store_path)?;

        Ok(())
    }
}
