//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! `RwLock<HashMap>` をインメモリのテーブルとして使用します。
//!
//! ロックを保持するのはテーブルの読み書きの間だけです。`snapshot` は sender を
//! clone して返すため、各ピアへの書き込みはロックの外で行われます。

use std::collections::{HashMap, hash_map::Entry};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    ClientSender, ConnectionEntry, ConnectionId, ConnectionRegistry, Peer, RegistryError, RoomName,
};

struct RegisteredConnection {
    entry: ConnectionEntry,
    sender: ClientSender,
}

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, RegisteredConnection>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn add(
        &self,
        id: ConnectionId,
        entry: ConnectionEntry,
        sender: ClientSender,
    ) -> Result<(), RegistryError> {
        let mut connections = self.connections.write().await;
        match connections.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateConnection(id)),
            Entry::Vacant(slot) => {
                slot.insert(RegisteredConnection { entry, sender });
                Ok(())
            }
        }
    }

    async fn remove(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        let mut connections = self.connections.write().await;
        connections.remove(id).map(|registered| registered.entry)
    }

    async fn snapshot(&self, room: &RoomName) -> Vec<Peer> {
        let connections = self.connections.read().await;
        connections
            .iter()
            .filter(|(_, registered)| &registered.entry.room == room)
            .map(|(id, registered)| Peer {
                id: *id,
                sender: registered.sender.clone(),
            })
            .collect()
    }

    async fn count_by_room(&self) -> HashMap<RoomName, usize> {
        let connections = self.connections.read().await;
        let mut counts = HashMap::new();
        for registered in connections.values() {
            *counts.entry(registered.entry.room.clone()).or_insert(0) += 1;
        }
        counts
    }

    async fn get(&self, id: &ConnectionId) -> Option<ConnectionEntry> {
        let connections = self.connections.read().await;
        connections.get(id).map(|registered| registered.entry.clone())
    }

    async fn len(&self) -> usize {
        self.connections.read().await.len()
    }
}
