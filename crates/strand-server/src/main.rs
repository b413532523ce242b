//! `Strand` server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use strand_log::{Log, LogConfig};
use strand_server::{Server, ServerConfig};

/// `Strand` commit log server.
#[derive(Parser)]
#[command(name = "strand-server")]
#[command(about = "Strand commit log server", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    bind: SocketAddr,

    /// Data directory for the log.
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Store rollover threshold in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    max_store_bytes: u64,

    /// Index rollover threshold in bytes.
    #[arg(long, default_value_t = 1024 * 1024)]
    max_index_bytes: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    let log_config = LogConfig::new()
        .with_max_store_bytes(cli.max_store_bytes)
        .with_max_index_bytes(cli.max_index_bytes);

    let log = Log::open(&cli.data_dir, log_config)
        .with_context(|| format!("failed to open log in {:?}", cli.data_dir))?;

    let config = ServerConfig::new(cli.bind, &cli.data_dir).with_log_config(log_config);
    let mut server = Server::new(config, Arc::new(log))
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    server.run().context("server loop failed")?;

    Ok(())
}
