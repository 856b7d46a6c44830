//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/messages`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub room: Option<String>,
    pub limit: Option<usize>,
}

/// Live member count of one room for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub room: String,
    pub members: usize,
}

/// Error body returned by the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Counters for `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDto {
    /// Live connections
    pub connections: usize,
    /// Rooms with at least one live connection
    pub rooms: usize,
    /// Free slots in the broadcast queue
    pub queue_available: usize,
    /// Messages dispatched since startup
    pub messages: u64,
    pub delivered: u64,
    pub failed: u64,
}
