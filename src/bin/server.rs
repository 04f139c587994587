//! EmberKV Server Binary
//!
//! Starts the TCP server for EmberKV.

use std::sync::Arc;

use clap::Parser;
use emberkv::network::Server;
use emberkv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// EmberKV Server
#[derive(Parser, Debug)]
#[command(name = "emberkv-server")]
#[command(about = "Single-node key-value server speaking a RESP-style protocol")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Close idle connections after this many milliseconds (0 = never)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Give up on a blocked write after this many milliseconds (0 = never)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info,emberkv=debug")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("EmberKV Server v{}", emberkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    let engine = Arc::new(Engine::new());

    // Start server
    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
