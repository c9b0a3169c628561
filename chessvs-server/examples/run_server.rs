//! Example to run the CHESSVS server standalone
//!
//! Run with: cargo run -p chessvs-server --example run_server

use chessvs_core::GameConfig;
use chessvs_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    println!("Starting CHESSVS server on port {}", config.port);
    println!("Static files from: {}", config.static_dir);
    println!("Open http://localhost:{}/", config.port);

    run_server(config, GameConfig::default()).await
}
