//! Server state shared by the HTTP and WebSocket handlers.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    domain::{AuthVerifier, ConnectionRegistry, MessageStore, RoomName},
    usecase::{BroadcastQueue, DispatchStats},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
    pub room: Option<String>,
}

/// Per-connection tunables
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub default_room: RoomName,
    /// Outgoing frames buffered per connection
    pub client_buffer: usize,
    /// Deadline for a single socket write
    pub write_timeout: Duration,
    pub history_limit: usize,
    pub history_max_limit: usize,
}

/// Shared application state
pub struct AppState {
    pub verifier: Arc<dyn AuthVerifier>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub store: Arc<dyn MessageStore>,
    /// Producer side of the broadcast queue
    pub queue: BroadcastQueue,
    pub stats: Arc<DispatchStats>,
    pub settings: ConnectionSettings,
    /// Fired once when the server starts shutting down
    pub shutdown: CancellationToken,
    /// Fired after the dispatcher has drained; connection writers flush and close
    pub close_connections: CancellationToken,
    /// Every live connection task, so shutdown can wait for them
    pub tasks: TaskTracker,
}
