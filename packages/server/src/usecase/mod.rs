//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod broadcast;
pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod get_history;
pub mod send_message;

pub use broadcast::{
    BroadcastDispatcher, BroadcastQueue, DispatchReport, DispatchStats, DispatchStatsSnapshot,
    broadcast_channel,
};
pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, HistoryError, QueueClosed, SendMessageError};
pub use get_history::GetHistoryUseCase;
pub use send_message::SendMessageUseCase;
