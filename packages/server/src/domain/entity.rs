//! Core domain models for the chat relay.

use serde::{Deserialize, Serialize};

use super::value_object::{MessageText, RoomName, Timestamp, UserId, Username};

/// Authenticated identity, fixed for the life of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: Username,
}

impl Identity {
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }
}

/// A live, authenticated connection as seen by the registry.
///
/// All fields are fixed once the connection is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEntry {
    /// Who is connected
    pub identity: Identity,
    /// Room the connection sends to and receives from
    pub room: RoomName,
    /// Timestamp when the connection was registered
    pub connected_at: Timestamp,
}

impl ConnectionEntry {
    pub fn new(identity: Identity, room: RoomName, connected_at: Timestamp) -> Self {
        Self {
            identity,
            room,
            connected_at,
        }
    }
}

/// An accepted chat message.
///
/// `user` and `timestamp` are always server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Sender's authenticated username
    pub user: Username,
    /// Message text
    pub text: MessageText,
    /// Room the message belongs to
    pub room: RoomName,
    /// Timestamp when the server accepted the message
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(user: Username, text: MessageText, room: RoomName, timestamp: Timestamp) -> Self {
        Self {
            user,
            text,
            room,
            timestamp,
        }
    }

    /// Build a message on behalf of `entry`, taking sender and room from the
    /// connection rather than from anything the client sent.
    pub fn from_connection(entry: &ConnectionEntry, text: MessageText, timestamp: Timestamp) -> Self {
        Self::new(
            entry.identity.username.clone(),
            text,
            entry.room.clone(),
            timestamp,
        )
    }
}
