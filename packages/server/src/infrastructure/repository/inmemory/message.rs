//! InMemory MessageStore 実装
//!
//! 保存順の連番を持つ VecDeque をインメモリ DB として使用します。
//! 保持件数の上限を超えると最も古いメッセージから破棄されます。

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, MessageStore, RoomName, StoreError, UserId};

/// Default number of messages retained across all rooms
pub const DEFAULT_RETENTION: usize = 10_000;

struct StoredMessage {
    seq: u64,
    message: ChatMessage,
}

#[derive(Default)]
struct Inner {
    next_seq: u64,
    messages: VecDeque<StoredMessage>,
}

/// インメモリ MessageStore 実装
pub struct InMemoryMessageStore {
    inner: Mutex<Inner>,
    retention: usize,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }

    /// Create a store that keeps at most `retention` messages.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            retention: retention.max(1),
        }
    }

    async fn select_recent<F>(&self, limit: usize, filter: F) -> Vec<ChatMessage>
    where
        F: Fn(&ChatMessage) -> bool,
    {
        let inner = self.inner.lock().await;

        // newest first, like `ORDER BY created_at DESC, id DESC LIMIT ?`
        let mut newest_first: Vec<&StoredMessage> = inner
            .messages
            .iter()
            .filter(|stored| filter(&stored.message))
            .collect();
        newest_first.sort_by(|a, b| {
            (b.message.timestamp, b.seq).cmp(&(a.message.timestamp, a.seq))
        });
        newest_first.truncate(limit);

        newest_first
            .into_iter()
            .rev()
            .map(|stored| stored.message.clone())
            .collect()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(&self, _user_id: UserId, message: &ChatMessage) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.messages.push_back(StoredMessage {
            seq,
            message: message.clone(),
        });
        while inner.messages.len() > self.retention {
            inner.messages.pop_front();
        }
        Ok(())
    }

    async fn recent_by_room(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.select_recent(limit, |m| &m.room == room).await)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        Ok(self.select_recent(limit, |_| true).await)
    }
}
