//! Ports the domain depends on.
//!
//! UseCase 層はこれらの trait にのみ依存し、具体的な実装（infrastructure 層）には
//! 依存しません（依存性の逆転）。

use std::collections::HashMap;

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, ConnectionEntry, Identity},
    error::{AuthError, RegistryError, StoreError},
    sender::ClientSender,
    value_object::{ConnectionId, RoomName, UserId},
};

/// One recipient taken out of the registry for a broadcast.
#[derive(Debug, Clone)]
pub struct Peer {
    pub id: ConnectionId,
    pub sender: ClientSender,
}

/// Turns a bearer token into an identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Durable message history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one accepted message.
    async fn save(&self, user_id: UserId, message: &ChatMessage) -> Result<(), StoreError>;

    /// Up to `limit` most recent messages in `room`, oldest first.
    async fn recent_by_room(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError>;

    /// Up to `limit` most recent messages across all rooms, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;
}

/// Concurrent table of live connections.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Register a connection.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateConnection` if `id` is already present.
    /// The existing entry is left untouched.
    async fn add(
        &self,
        id: ConnectionId,
        entry: ConnectionEntry,
        sender: ClientSender,
    ) -> Result<(), RegistryError>;

    /// Remove a connection. Removing an absent id is a no-op and returns `None`.
    async fn remove(&self, id: &ConnectionId) -> Option<ConnectionEntry>;

    /// Point-in-time copy of the peers currently in `room`.
    async fn snapshot(&self, room: &RoomName) -> Vec<Peer>;

    /// Live member count per room.
    async fn count_by_room(&self) -> HashMap<RoomName, usize>;

    async fn get(&self, id: &ConnectionId) -> Option<ConnectionEntry>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
