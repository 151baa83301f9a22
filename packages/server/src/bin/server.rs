//! Debate room hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin agora-server
//! cargo run --bin agora-server -- --host 0.0.0.0 --port 3000
//! AGORA_PONG_WAIT_SECS=30 cargo run --bin agora-server
//! ```

use agora_server::{
    app::{Dependencies, assemble},
    config::ServerArgs,
    ui::Server,
};
use agora_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&["agora_server", "agora_shared", "tower_http"], "debug");

    let config = ServerArgs::parse().into_config();
    tracing::debug!(?config, "Loaded configuration");

    let (state, hub) = assemble(Dependencies::in_memory(), config.connection);
    tokio::spawn(hub.run());

    let server = Server::new(state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
