//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 受信フレームのデコード、サーバー側の値での上書き、永続化、キューへの投入
//!
//! ### なぜこのテストが必要か
//! - なりすまし防止：`user` は常に接続の認証済み username になる
//! - 永続化の失敗が配信を妨げないことを保証
//! - 不正なフレームはそのフレームだけが破棄されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：text のみのフレーム
//! - 異常系：`user` / `room` / `timestamp` を偽装したフレーム
//! - 異常系：不正な JSON、空の text、保存失敗、キューの停止

use std::sync::Arc;

use crate::{
    domain::{ChatMessage, ConnectionEntry, MessageStore, MessageText, Timestamp},
    infrastructure::dto::websocket::IncomingChatMessage,
};

use super::{broadcast::BroadcastQueue, error::SendMessageError};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    store: Arc<dyn MessageStore>,
    queue: BroadcastQueue,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>, queue: BroadcastQueue) -> Self {
        Self { store, queue }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `entry` - 送信元の接続
    /// * `raw` - クライアントから受信したテキストフレーム
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - キューに投入されたメッセージ
    /// * `Err(SendMessageError)` - 破棄されたフレーム、またはキューの停止
    pub async fn execute(
        &self,
        entry: &ConnectionEntry,
        raw: &str,
    ) -> Result<ChatMessage, SendMessageError> {
        // 1. デコード
        let incoming: IncomingChatMessage = serde_json::from_str(raw)?;
        if let Some(claimed) = incoming.user.as_deref()
            && claimed != entry.identity.username.as_str()
        {
            tracing::debug!(
                "Ignoring client-supplied user '{}' from '{}'",
                claimed,
                entry.identity.username
            );
        }

        // 2. サーバー側の値で組み立て（user / room / timestamp はクライアントの値を使わない）
        let text = MessageText::new(incoming.text)?;
        let message = ChatMessage::from_connection(entry, text, Timestamp::now());

        // 3. 永続化（失敗しても配信は続ける）
        if let Err(e) = self.store.save(entry.identity.user_id, &message).await {
            tracing::warn!("Failed to save message from '{}': {}", message.user, e);
        }

        // 4. キューに投入（満杯なら空きが出るまで待つ）
        self.queue.enqueue(message.clone()).await?;
        Ok(message)
    }
}
