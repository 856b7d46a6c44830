//! WebSocket chat server implementation.

pub mod config;
mod handler;
mod runner;
mod signal;
pub mod state;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

pub use config::{ServerConfig, StoreBackend};
pub use runner::{Server, run};
pub use signal::shutdown_signal;

use handler::{get_messages, get_rooms, get_stats, health_check, websocket_handler};
use state::AppState;

/// Routes served by the relay.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/messages", get(get_messages))
        .route("/api/rooms", get(get_rooms))
        .route("/api/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
