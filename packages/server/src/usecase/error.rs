//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ConnectionId, RegistryError, StoreError, ValueObjectError};

/// 接続登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// Registry invariant violation; the connection must not proceed.
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),
}

impl From<RegistryError> for ConnectError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::DuplicateConnection(id) => ConnectError::DuplicateConnection(id),
        }
    }
}

/// The broadcast queue has been closed (shutdown in progress).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("broadcast queue is closed")]
pub struct QueueClosed;

/// メッセージ送信のエラー
#[derive(Debug, Error)]
pub enum SendMessageError {
    /// Frame is not a valid chat message. Local to the frame.
    #[error("malformed frame: {0}")]
    Decode(#[from] serde_json::Error),

    /// Frame decoded but its content is not acceptable. Local to the frame.
    #[error("invalid message content: {0}")]
    InvalidContent(#[from] ValueObjectError),

    /// No dispatcher is accepting messages any more.
    #[error(transparent)]
    QueueClosed(#[from] QueueClosed),
}

/// 履歴取得のエラー
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid room: {0}")]
    InvalidRoom(#[from] ValueObjectError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
