//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use strand_log::LogConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Path to the log's data directory.
    pub data_dir: PathBuf,
    /// Read buffer size per connection.
    pub read_buffer_size: usize,
    /// Configuration for the underlying log.
    pub log: LogConfig,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: impl Into<SocketAddr>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            data_dir: data_dir.into(),
            read_buffer_size: 8 * 1024, // 8 KiB
            log: LogConfig::default(),
        }
    }

    /// Sets the per-connection read buffer size.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Sets the log configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7070".parse().expect("valid address"),
            data_dir: PathBuf::from("./data"),
            read_buffer_size: 8 * 1024,
            log: LogConfig::default(),
        }
    }
}
