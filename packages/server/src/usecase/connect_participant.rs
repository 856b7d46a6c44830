//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::authenticate() / execute() メソッド
//! - トークン検証と Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続は Registry に一切追加されないことを保証
//! - 登録されたエントリの identity が AuthVerifier の結果と一致することを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なトークンでの接続
//! - 異常系：トークンなし・無効なトークン
//! - 異常系：同じ接続 ID の二重登録

use std::sync::Arc;

use crate::domain::{
    AuthError, AuthVerifier, ClientSender, ConnectionEntry, ConnectionId, ConnectionRegistry,
    Identity, RoomName, Timestamp,
};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    verifier: Arc<dyn AuthVerifier>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(verifier: Arc<dyn AuthVerifier>, registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { verifier, registry }
    }

    /// ハンドシェイクのトークンを検証
    ///
    /// # Arguments
    ///
    /// * `token` - クエリパラメータ `token` の値（なければ None）
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - 認証成功
    /// * `Err(AuthError)` - トークンなし・無効・期限切れ
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        match token {
            Some(token) if !token.is_empty() => self.verifier.verify(token).await,
            _ => Err(AuthError::MissingToken),
        }
    }

    /// 認証済みの接続を Registry に登録
    ///
    /// # Arguments
    ///
    /// * `id` - 接続 ID
    /// * `identity` - 認証済みの identity
    /// * `room` - 接続が参加するルーム
    /// * `sender` - この接続への書き込みチャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionEntry)` - 登録されたエントリ
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(
        &self,
        id: ConnectionId,
        identity: Identity,
        room: RoomName,
        sender: ClientSender,
    ) -> Result<ConnectionEntry, ConnectError> {
        let entry = ConnectionEntry::new(identity, room, Timestamp::now());
        self.registry.add(id, entry.clone(), sender).await?;
        Ok(entry)
    }
}
