//! Token Forge Server - Entry Point
//!
//! HTTP service that provisions token contract sources from a template,
//! compiles them with an external Move toolchain, and relays publish
//! requests to a remote RPC endpoint.

use log::warn;

use token_forge_server::Server;
use token_forge_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    // A missing or broken configuration file is not fatal; every value has a
    // documented default.
    let config = ServerConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration: {}; using defaults", e);
        ServerConfig::default()
    });

    let server = Server::new(config).await;
    server.start().await;
}
