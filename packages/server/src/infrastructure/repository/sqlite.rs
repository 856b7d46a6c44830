//! SQLite MessageStore 実装
//!
//! rusqlite の同期 API を `spawn_blocking` 上で実行します。
//! `messages` テーブルは `created_at`（Unix ミリ秒）の降順で取得した後、
//! 古い順に並べ替えて返します。

use std::{path::Path, sync::Arc};

use async_trait::async_trait;
use rusqlite::{Connection, params};
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, MessageStore, MessageText, RoomName, StoreError, Timestamp, UserId, Username,
};

const CREATE_MESSAGES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        username TEXT NOT NULL,
        text TEXT NOT NULL,
        room TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_room_created_at
        ON messages (room, created_at);
";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// SQLite MessageStore 実装
#[derive(Clone)]
pub struct SqliteMessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    /// Open (or create) the database file at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Private in-memory database, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_MESSAGES_TABLE)?;
        tracing::info!("Message store initialized");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

type MessageRow = (String, String, String, i64);

fn query_newest_first(
    conn: &Connection,
    room: Option<&str>,
    limit: usize,
) -> Result<Vec<MessageRow>, StoreError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<MessageRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    };

    let rows = match room {
        Some(room) => {
            let mut stmt = conn.prepare(
                "SELECT username, text, room, created_at FROM messages
                 WHERE room = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![room, limit], map)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT username, text, room, created_at FROM messages
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], map)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        }
    };
    Ok(rows)
}

/// Convert newest-first rows into oldest-first messages.
fn into_messages(mut rows: Vec<MessageRow>) -> Result<Vec<ChatMessage>, StoreError> {
    rows.reverse();
    rows.into_iter()
        .map(|(username, text, room, created_at)| -> Result<ChatMessage, StoreError> {
            Ok(ChatMessage::new(
                Username::new(username)?,
                MessageText::new(text)?,
                RoomName::new(room)?,
                Timestamp::new(created_at),
            ))
        })
        .collect()
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn save(&self, user_id: UserId, message: &ChatMessage) -> Result<(), StoreError> {
        let message = message.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO messages (user_id, username, text, room, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id.value(),
                    message.user.as_str(),
                    message.text.as_str(),
                    message.room.as_str(),
                    message.timestamp.value(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn recent_by_room(
        &self,
        room: &RoomName,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let room = room.as_str().to_string();
        let rows = self
            .with_conn(move |conn| query_newest_first(conn, Some(&room), limit))
            .await?;
        into_messages(rows)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = self
            .with_conn(move |conn| query_newest_first(conn, None, limit))
            .await?;
        into_messages(rows)
    }
}
