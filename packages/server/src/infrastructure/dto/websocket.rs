//! WebSocket message DTOs for the chat relay.
//!
//! The same JSON shape travels in both directions:
//! `{"user": string, "text": string, "room": string, "timestamp": string}`.
//! Clients may omit everything but `text`; the server fills in the rest.

use serde::{Deserialize, Serialize};

use crate::domain::ChatMessage;

/// Frame received from a client.
///
/// `user`, `room` and `timestamp` are accepted for compatibility but never trusted.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingChatMessage {
    #[serde(default)]
    pub user: Option<String>,
    pub text: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Frame broadcast to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub user: String,
    pub text: String,
    pub room: String,
    /// RFC 3339
    pub timestamp: String,
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            user: message.user.as_str().to_string(),
            text: message.text.as_str().to_string(),
            room: message.room.as_str().to_string(),
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}
