//! UseCase: メッセージ履歴の取得
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - GetHistoryUseCase::execute() メソッド
//! - limit の既定値・上限、ルーム指定の有無による問い合わせ先の切り替え
//!
//! ### なぜこのテストが必要か
//! - 巨大な limit でストアに過剰な問い合わせをしないことを保証
//! - ストアの並び順（古い順）がそのまま返ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム指定あり・なし
//! - エッジケース：limit なし・0・上限超過
//! - 異常系：不正なルーム名、ストアのエラー

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageStore, RoomName};

use super::error::HistoryError;

/// Default number of messages returned when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Largest limit a caller may request
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    store: Arc<dyn MessageStore>,
    default_limit: usize,
    max_limit: usize,
}

impl GetHistoryUseCase {
    /// 新しい GetHistoryUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>, default_limit: usize, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            store,
            default_limit: default_limit.clamp(1, max_limit),
            max_limit,
        }
    }

    /// 実際に問い合わせる件数
    ///
    /// 指定なし・0 は既定値、上限を超える値は上限に丸める。
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(0) | None => self.default_limit,
            Some(limit) => limit.min(self.max_limit),
        }
    }

    /// 履歴取得を実行
    ///
    /// # Arguments
    ///
    /// * `room` - 対象ルーム（なし・空白なら全ルーム）
    /// * `limit` - 最大件数
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ChatMessage>)` - 古い順のメッセージ
    /// * `Err(HistoryError)` - 不正なルーム名、またはストアのエラー
    pub async fn execute(
        &self,
        room: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, HistoryError> {
        let limit = self.effective_limit(limit);
        let messages = match room.filter(|name| !name.trim().is_empty()) {
            Some(name) => {
                let room = RoomName::new(name.to_string())?;
                self.store.recent_by_room(&room, limit).await?
            }
            None => self.store.recent(limit).await?,
        };
        tracing::debug!(
            "Loaded {} history messages (room: {:?}, limit: {})",
            messages.len(),
            room,
            limit
        );
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        MessageText, StoreError, Timestamp, Username, repository::MockMessageStore,
    };

    fn message(text: &str, room: &str, ts: i64) -> ChatMessage {
        ChatMessage::new(
            Username::new("alice".to_string()).unwrap(),
            MessageText::new(text.to_string()).unwrap(),
            RoomName::new(room.to_string()).unwrap(),
            Timestamp::new(ts),
        )
    }

    #[tokio::test]
    async fn test_history_by_room() {
        // テスト項目: ルーム指定時は recent_by_room が呼ばれ、結果がそのまま返る
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_recent_by_room()
            .withf(|room, limit| room.as_str() == "dev" && *limit == 2)
            .times(1)
            .returning(|_, _| Ok(vec![message("m2", "dev", 2), message("m3", "dev", 3)]));
        store.expect_recent().never();
        let usecase = GetHistoryUseCase::new(Arc::new(store), 50, 1000);

        // when (操作):
        let result = usecase.execute(Some("dev"), Some(2)).await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = result.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3"]);
    }

    #[tokio::test]
    async fn test_history_all_rooms() {
        // テスト項目: ルーム指定なし・空白の場合は全ルームから既定件数を取得する
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_recent()
            .withf(|limit| *limit == 50)
            .times(2)
            .returning(|_| Ok(vec![message("m1", "general", 1)]));
        let usecase = GetHistoryUseCase::new(Arc::new(store), 50, 1000);

        // when (操作):
        let missing = usecase.execute(None, None).await.unwrap();
        let blank = usecase.execute(Some("  "), Some(0)).await.unwrap();

        // then (期待する結果):
        assert_eq!(missing.len(), 1);
        assert_eq!(blank.len(), 1);
    }

    #[test]
    fn test_effective_limit() {
        // テスト項目: limit の既定値と上限
        let usecase = GetHistoryUseCase::new(Arc::new(MockMessageStore::new()), 50, 1000);

        assert_eq!(usecase.effective_limit(None), 50);
        assert_eq!(usecase.effective_limit(Some(0)), 50);
        assert_eq!(usecase.effective_limit(Some(10)), 10);
        assert_eq!(usecase.effective_limit(Some(1_000_000)), 1000);
    }

    #[tokio::test]
    async fn test_history_invalid_room() {
        // テスト項目: 長すぎるルーム名は InvalidRoom になり、ストアは呼ばれない
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_recent_by_room().never();
        let usecase = GetHistoryUseCase::new(Arc::new(store), 50, 1000);
        let room = "r".repeat(101);

        // when (操作):
        let result = usecase.execute(Some(&room), None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(HistoryError::InvalidRoom(_))));
    }

    #[tokio::test]
    async fn test_history_store_error() {
        // テスト項目: ストアのエラーは Store として返る
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_recent()
            .returning(|_| Err(StoreError::Backend("locked".to_string())));
        let usecase = GetHistoryUseCase::new(Arc::new(store), 50, 1000);

        // when (操作):
        let result = usecase.execute(None, None).await;

        // then (期待する結果):
        assert!(matches!(result, Err(HistoryError::Store(_))));
    }
}
