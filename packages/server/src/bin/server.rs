//! Room-scoped WebSocket chat relay server.
//!
//! Run with:
//! ```not_rust
//! JWT_SECRET=... cargo run --bin chatrelay-server
//! cargo run --bin chatrelay-server -- --static-token dev-token:1:alice
//! ```

use chatrelay_server::ServerConfig;
use chatrelay_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = chatrelay_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
