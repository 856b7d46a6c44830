//! Domain layer for the chat relay.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod repository;
pub mod sender;
pub mod value_object;

pub use entity::{ChatMessage, ConnectionEntry, Identity};
pub use error::{
    AuthError, DeliveryError, LifecycleError, RegistryError, StoreError, ValueObjectError,
};
pub use factory::ConnectionIdFactory;
pub use lifecycle::{ConnectionLifecycle, ConnectionState};
pub use repository::{AuthVerifier, ConnectionRegistry, MessageStore, Peer};
pub use sender::{ClientSender, Frame};
pub use value_object::{
    ConnectionId, DEFAULT_ROOM, MessageText, RoomName, Timestamp, UserId, Username,
};
