//! HashMap / Vec backed implementations.

mod connection;
mod message;

pub use connection::InMemoryConnectionRegistry;
pub use message::InMemoryMessageStore;
