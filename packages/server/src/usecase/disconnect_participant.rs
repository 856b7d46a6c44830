//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - Registry からの接続の削除
//!
//! ### なぜこのテストが必要か
//! - 切断後の接続がブロードキャストの対象にならないことを保証
//! - 二重の切断（reader 終了と shutdown の競合など）が安全であることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済み接続の切断
//! - エッジケース：既に削除された接続の切断（冪等）

use std::sync::Arc;

use crate::domain::{ConnectionEntry, ConnectionId, ConnectionRegistry};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行
    ///
    /// # Arguments
    ///
    /// * `id` - 切断する接続の ID
    ///
    /// # Returns
    ///
    /// * `Some(ConnectionEntry)` - 削除されたエントリ
    /// * `None` - 既に削除済み
    pub async fn execute(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        let removed = self.registry.remove(id).await;
        match &removed {
            Some(entry) => tracing::info!(
                "Connection '{}' ({}) left room '{}', {} connections remaining",
                id,
                entry.identity.username,
                entry.room,
                self.registry.len().await
            ),
            None => tracing::debug!("Connection '{}' was already removed", id),
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            ClientSender, ConnectionIdFactory, Identity, RoomName, Timestamp, UserId, Username,
        },
        infrastructure::repository::InMemoryConnectionRegistry,
    };

    async fn registered(
        registry: &InMemoryConnectionRegistry,
        username: &str,
    ) -> (ConnectionId, tokio::sync::mpsc::Receiver<crate::domain::Frame>) {
        let id = ConnectionIdFactory::generate();
        let (sender, rx) = ClientSender::channel(4);
        let entry = ConnectionEntry::new(
            Identity::new(UserId::new(1), Username::new(username.to_string()).unwrap()),
            RoomName::default(),
            Timestamp::new(0),
        );
        registry.add(id, entry, sender).await.unwrap();
        (id, rx)
    }

    #[tokio::test]
    async fn test_disconnect_removes_connection() {
        // テスト項目: 切断した接続だけが Registry から削除される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (alice, _rx_a) = registered(&registry, "alice").await;
        let (_bob, _rx_b) = registered(&registry, "bob").await;
        let usecase = DisconnectParticipantUseCase::new(registry.clone());

        // when (操作):
        let removed = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(removed.unwrap().identity.username.as_str(), "alice");
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(&alice).await.is_none());
        assert!(registry.snapshot(&RoomName::default()).await.iter().all(|p| p.id != alice));
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        // テスト項目: 二度目の切断は None を返し、他の接続に影響しない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let (alice, _rx_a) = registered(&registry, "alice").await;
        let (_bob, _rx_b) = registered(&registry, "bob").await;
        let usecase = DisconnectParticipantUseCase::new(registry.clone());
        usecase.execute(&alice).await;

        // when (操作):
        let second = usecase.execute(&alice).await;

        // then (期待する結果):
        assert!(second.is_none());
        assert_eq!(registry.len().await, 1);
    }
}
