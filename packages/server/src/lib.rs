//! Room-scoped WebSocket chat relay.
//!
//! Authenticated clients join a room over WebSocket; every accepted message is
//! persisted, queued on a bounded broadcast queue and written to each live
//! connection in the same room.

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use error::ServerError;
pub use ui::{Server, ServerConfig, run as run_server};
