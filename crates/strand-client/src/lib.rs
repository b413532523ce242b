//! # strand-client: RPC client for `Strand`
//!
//! A blocking client for the `Strand` wire protocol: produce appends a
//! record and returns its offset, consume reads a record back by offset.
//!
//! Consumers that want to follow the log's tail call `consume` in a loop
//! and treat [`ClientError::is_offset_out_of_range`] as "wait and retry";
//! the server does not push.

mod client;
mod error;

pub use client::{Client, ClientConfig};
pub use error::{ClientError, ClientResult};
