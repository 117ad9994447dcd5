//! PackDeque Server Binary
//!
//! Starts the TCP server for PackDeque.

use std::sync::Arc;

use clap::Parser;
use packdeque::network::Server;
use packdeque::{Config, Engine, NodeLimits};
use tracing_subscriber::{fmt, EnvFilter};

/// PackDeque Server
#[derive(Parser, Debug)]
#[command(name = "packdeque-server")]
#[command(about = "In-memory deque store with compact packed encoding")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    listen: String,

    /// Maximum queued or active connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Max encoded bytes per deque node
    #[arg(long, default_value = "8192")]
    node_max_bytes: usize,

    /// Max elements per deque node
    #[arg(long, default_value = "1024")]
    node_max_entries: usize,

    /// Number of keyspace shards
    #[arg(short, long, default_value = "16")]
    shards: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,packdeque=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("PackDeque Server v{}", packdeque::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .node_limits(NodeLimits::new(args.node_max_bytes, args.node_max_entries))
        .keyspace_shards(args.shards)
        .build();

    // Create engine
    let engine = match Engine::new(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to create engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized successfully");

    // Start server
    let mut server = Server::new(config, engine);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
