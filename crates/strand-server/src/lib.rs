//! # strand-server: `Strand` server daemon
//!
//! This crate provides the TCP server that exposes a `Strand` commit log
//! over the network using the binary wire protocol defined in
//! `strand-wire`.
//!
//! ## Architecture
//!
//! The server uses `mio` for non-blocking I/O with a poll-based event
//! loop. This follows the project's design principle of explicit control
//! flow without async runtimes: the log is synchronous and blocking, so
//! the server drives it directly from the event loop thread.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     strand-server                       │
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐  │
//! │  │  Listener   │ → │ Connections │ → │ RequestHandler│  │
//! │  │  (TCP)      │   │ (mio poll)  │   │ (→ CommitLog) │  │
//! │  └─────────────┘   └─────────────┘   └───────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers that want streaming semantics poll: they consume an offset
//! and treat an out-of-range error as "wait and retry". The server pushes
//! nothing.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use strand_log::{Log, LogConfig};
//! use strand_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new("127.0.0.1:7070".parse()?, "./data");
//! let log = Arc::new(Log::open(&config.data_dir, config.log)?);
//! let mut server = Server::new(config, log)?;
//! server.run()?;
//! ```

mod config;
mod connection;
mod error;
mod handler;
mod server;
#[cfg(test)]
mod tests;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use server::Server;
