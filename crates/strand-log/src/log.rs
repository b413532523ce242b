//! The log: an ordered collection of segments behind one offset space.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strand_types::Record;

use crate::config::LogConfig;
use crate::error::{LogError, LogResult};
use crate::segment::Segment;
use crate::store::Store;

/// The interface transports program against.
///
/// `Log` implements it directly; tests and alternative backends can
/// substitute their own implementation behind `Arc<dyn CommitLog>`.
pub trait CommitLog: Send + Sync {
    /// Appends a record and returns its assigned offset.
    fn append(&self, record: Record) -> LogResult<u64>;
    /// Reads the record stored at the given offset.
    fn read(&self, offset: u64) -> LogResult<Record>;
}

/// An append-only, segmented, offset-addressed commit log over a
/// directory.
///
/// Exactly one segment (always the last) is *active* and receives
/// appends. Segment ranges are contiguous and non-overlapping, so every
/// offset in `[lowest, highest]` resolves to exactly one segment.
///
/// A single log instance serves one writer. Two instances over the same
/// directory are undefined behavior.
#[derive(Debug)]
pub struct Log {
    dir: PathBuf,
    config: LogConfig,
    /// Segments in ascending base-offset order; the last is active.
    segments: RwLock<Vec<Segment>>,
}

impl Log {
    /// Opens the log over `dir`, creating the directory if needed.
    ///
    /// Existing segments are discovered from the numeric stems of the
    /// files on disk; an empty directory gets one fresh segment at
    /// `config.segment.initial_offset`.
    pub fn open(dir: impl Into<PathBuf>, config: LogConfig) -> LogResult<Self> {
        let dir = dir.into();
        let config = config.normalized();

        fs::create_dir_all(&dir)?;
        let segments = Self::load_segments(&dir, config)?;

        Ok(Self {
            dir,
            config,
            segments: RwLock::new(segments),
        })
    }

    fn load_segments(dir: &Path, config: LogConfig) -> LogResult<Vec<Segment>> {
        let mut bases = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if let Ok(base) = stem.parse::<u64>() {
                bases.push(base);
            }
        }

        // Each base offset appears once per extension.
        bases.sort_unstable();
        bases.dedup();

        let mut segments = Vec::with_capacity(bases.len().max(1));
        for base in bases {
            segments.push(Segment::open(dir, base, config.segment)?);
        }
        if segments.is_empty() {
            segments.push(Segment::open(dir, config.segment.initial_offset, config.segment)?);
        }

        Ok(segments)
    }

    fn read_lock(&self) -> LogResult<RwLockReadGuard<'_, Vec<Segment>>> {
        self.segments
            .read()
            .map_err(|_| LogError::Io(io::Error::other("log lock poisoned")))
    }

    fn write_lock(&self) -> LogResult<RwLockWriteGuard<'_, Vec<Segment>>> {
        self.segments
            .write()
            .map_err(|_| LogError::Io(io::Error::other("log lock poisoned")))
    }

    /// Appends a record to the active segment and returns its offset.
    ///
    /// If the active segment is maxed after the append, a fresh segment is
    /// created at `offset + 1` and becomes active, so offsets never repeat
    /// and never gap.
    pub fn append(&self, record: Record) -> LogResult<u64> {
        let mut segments = self.write_lock()?;
        let active = segments.last_mut().ok_or(LogError::Closed)?;
        let rollover_base = active.next_offset();

        let offset = match active.append(record.clone()) {
            Ok(offset) => offset,
            Err(LogError::EndOfIndex) => {
                // The active segment came back from disk with a full
                // index. Roll a fresh segment and retry once; the store
                // bytes of the failed attempt are abandoned.
                segments.push(Segment::open(&self.dir, rollover_base, self.config.segment)?);
                let fresh = segments.last_mut().expect("segment was just pushed");
                fresh.append(record)?
            }
            Err(e) => return Err(e),
        };

        let maxed = segments.last().is_some_and(Segment::is_maxed);
        if maxed {
            segments.push(Segment::open(&self.dir, offset + 1, self.config.segment)?);
        }

        Ok(offset)
    }

    /// Reads the record stored at the given offset.
    pub fn read(&self, offset: u64) -> LogResult<Record> {
        let segments = self.read_lock()?;
        let segment = segments
            .iter()
            .find(|segment| segment.contains(offset))
            .ok_or(LogError::OffsetOutOfRange { offset })?;

        segment.read(offset)
    }

    /// Returns the lowest offset held by the log.
    pub fn lowest_offset(&self) -> LogResult<u64> {
        let segments = self.read_lock()?;
        segments
            .first()
            .map(Segment::base_offset)
            .ok_or(LogError::Closed)
    }

    /// Returns the highest offset held by the log, or 0 when empty.
    pub fn highest_offset(&self) -> LogResult<u64> {
        let segments = self.read_lock()?;
        let next = segments.last().ok_or(LogError::Closed)?.next_offset();

        Ok(next.saturating_sub(1))
    }

    /// Removes every segment whose records all lie at or below `lowest`.
    ///
    /// Retention policies call this to drop whole segments; offsets above
    /// the removed segments stay readable.
    pub fn truncate(&self, lowest: u64) -> LogResult<()> {
        let mut segments = self.write_lock()?;

        let old = std::mem::take(&mut *segments);
        let mut retained = Vec::with_capacity(old.len());
        for segment in old {
            if segment.next_offset() <= lowest + 1 {
                segment.remove()?;
            } else {
                retained.push(segment);
            }
        }
        *segments = retained;

        Ok(())
    }

    /// Returns a sequential reader over the raw store files of every
    /// segment, in segment order.
    ///
    /// The reader parses no record framing; consumers see the stores'
    /// bytes exactly as on disk (8-byte big-endian length prefix, then the
    /// encoded record). Store sizes are snapshotted here, and the reader
    /// keeps its own handles, so a concurrent truncate cannot invalidate
    /// the stream.
    pub fn reader(&self) -> LogResult<LogReader> {
        let segments = self.read_lock()?;

        let mut sources = Vec::with_capacity(segments.len());
        for segment in segments.iter() {
            let store = segment.store();
            let len = store.size()?;
            sources.push(StoreSource {
                store,
                position: 0,
                len,
            });
        }

        Ok(LogReader {
            sources,
            current: 0,
        })
    }

    /// Closes every segment. Further appends and offset queries fail.
    pub fn close(&self) -> LogResult<()> {
        let mut segments = self.write_lock()?;
        for segment in segments.drain(..) {
            segment.close()?;
        }
        Ok(())
    }

    /// Closes the log and deletes its directory tree.
    pub fn remove(&self) -> LogResult<()> {
        self.close()?;
        fs::remove_dir_all(&self.dir)?;
        Ok(())
    }

    /// Removes the log and bootstraps a fresh one in its place.
    pub fn reset(&self) -> LogResult<()> {
        self.remove()?;
        fs::create_dir_all(&self.dir)?;

        let mut segments = self.write_lock()?;
        *segments = Self::load_segments(&self.dir, self.config)?;

        Ok(())
    }

    /// Returns the log's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the log's configuration (with defaults applied).
    pub fn config(&self) -> LogConfig {
        self.config
    }
}

impl CommitLog for Log {
    fn append(&self, record: Record) -> LogResult<u64> {
        Log::append(self, record)
    }

    fn read(&self, offset: u64) -> LogResult<Record> {
        Log::read(self, offset)
    }
}

/// One store's slice of a [`LogReader`] stream.
#[derive(Debug)]
struct StoreSource {
    store: Arc<Store>,
    position: u64,
    /// Store size at snapshot time; bytes appended later are not streamed.
    len: u64,
}

/// Sequential byte reader over the concatenation of every segment's raw
/// store file.
///
/// Obtained from [`Log::reader`]. Holds its own store handles, so it stays
/// valid across concurrent log operations.
#[derive(Debug)]
pub struct LogReader {
    sources: Vec<StoreSource>,
    current: usize,
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(source) = self.sources.get_mut(self.current) {
            if source.position >= source.len {
                self.current += 1;
                continue;
            }

            let remaining = source.len - source.position;
            let want = (remaining.min(buf.len() as u64)) as usize;
            let n = source.store.read_at(&mut buf[..want], source.position)?;
            if n == 0 {
                self.current += 1;
                continue;
            }

            source.position += n as u64;
            return Ok(n);
        }

        Ok(0)
    }
}
