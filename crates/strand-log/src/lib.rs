//! # strand-log: Segmented, offset-addressed commit log
//!
//! This crate implements the durable storage engine under `Strand`:
//! records are appended in order, each receives a monotonically increasing
//! 64-bit offset, and any past record can be read back by its offset. The
//! log is partitioned on disk into segments so old data can be truncated
//! cheaply and active writes stay bounded in size.
//!
//! # Components
//!
//! - [`Store`]: byte-addressed append-only file of length-prefixed entries
//! - [`Index`]: memory-mapped fixed-width table mapping relative offsets
//!   to store positions
//! - [`Segment`]: one store/index pair owning the offset range
//!   `[base, next)`
//! - [`Log`]: ordered segments behind a single offset space, with
//!   rollover, truncation, and a raw byte reader
//!
//! # File Layout
//!
//! ```text
//! data_dir/
//!   0.store       # [len:u64 BE][payload] entries
//!   0.index       # [rel_off:u32 BE][pos:u64 BE] entries
//!   1749.store    # next segment, base offset 1749
//!   1749.index
//! ```
//!
//! Filenames are the segment's base offset in unpadded decimal. Index
//! files are `max_index_bytes` long while open (reserved for the memory
//! mapping) and are trimmed to their entry region on clean close.
//!
//! # Concurrency
//!
//! All operations are synchronous and blocking. The log holds one
//! readers-writer lock: appends and structural changes take the writer
//! side, reads take the reader side. Each store serializes on its own
//! mutex. A single log instance serves one writer.
//!
//! # Example
//!
//! ```ignore
//! use strand_log::{Log, LogConfig};
//! use strand_types::Record;
//!
//! let log = Log::open("/data/strand", LogConfig::default())?;
//!
//! let offset = log.append(Record::new("hello world"))?;
//! let record = log.read(offset)?;
//! assert_eq!(record.value.as_ref(), b"hello world");
//! ```

mod config;
mod error;
mod index;
mod log;
mod segment;
mod store;

pub use config::{LogConfig, SegmentConfig, DEFAULT_MAX_BYTES};
pub use error::{LogError, LogResult};
pub use index::{Index, ENTRY_WIDTH, OFF_WIDTH, POS_WIDTH};
pub use log::{CommitLog, Log, LogReader};
pub use segment::Segment;
pub use store::{Store, LEN_WIDTH};
