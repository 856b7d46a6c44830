//! Domain layer error definitions.

use thiserror::Error;

use super::{lifecycle::ConnectionState, value_object::ConnectionId};

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("Username cannot be empty")]
    UsernameEmpty,

    #[error("Username cannot exceed {max} bytes (got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("RoomName cannot be empty")]
    RoomNameEmpty,

    #[error("RoomName cannot exceed {max} bytes (got {actual})")]
    RoomNameTooLong { max: usize, actual: usize },

    #[error("MessageText cannot be empty")]
    MessageTextEmpty,

    #[error("MessageText cannot exceed {max} bytes (got {actual})")]
    MessageTextTooLong { max: usize, actual: usize },
}

/// Handshake authentication failures. Fatal to the connection attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("no token provided")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,
}

impl AuthError {
    /// Text frame sent to the client before the connection is closed.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authentication required",
            AuthError::InvalidToken(_) | AuthError::Expired => "Invalid token",
        }
    }
}

/// Message persistence failures. Never block delivery.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("storage task failed: {0}")]
    Task(String),

    #[error("stored row is invalid: {0}")]
    InvalidRow(#[from] ValueObjectError),
}

/// Registry invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),
}

/// Write to a single peer failed. Local to that peer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("peer did not accept the frame before the write deadline")]
    Timeout,

    #[error("peer connection is closed")]
    Closed,
}

/// Illegal connection state transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("invalid connection state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },
}
