//! UseCase: ルーム単位のブロードキャスト
//!
//! 受理されたメッセージは容量制限付きのキュー（[`BroadcastQueue`]）に積まれ、
//! 単一の [`BroadcastDispatcher`] が取り出して同じルームの全接続に書き込みます。
//!
//! - キューが満杯のとき、送信側（接続ハンドラ）は空きができるまで待たされる
//! - メッセージは一度だけシリアライズされ、同じフレームを全ピアに書き込む
//! - 1 ピアへの書き込み失敗は記録されるだけで、他のピアへの配信も Registry も変わらない
//! - 全ての [`BroadcastQueue`] が drop されるか shutdown トークンが発火すると、
//!   バッファ済みのメッセージを配信し終えてから終了する

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatMessage, ConnectionRegistry, Frame},
    infrastructure::dto::websocket::ChatMessageDto,
};

use super::error::QueueClosed;

/// Default number of accepted messages that may wait for dispatch
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default per-peer write deadline
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a bounded broadcast queue and the receiver a dispatcher drains.
pub fn broadcast_channel(capacity: usize) -> (BroadcastQueue, mpsc::Receiver<ChatMessage>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (BroadcastQueue { sender: tx }, rx)
}

/// Producer side of the broadcast queue. One clone per connection handler.
#[derive(Debug, Clone)]
pub struct BroadcastQueue {
    sender: mpsc::Sender<ChatMessage>,
}

impl BroadcastQueue {
    /// Enqueue a message, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `QueueClosed` once the dispatcher has stopped accepting messages.
    pub async fn enqueue(&self, message: ChatMessage) -> Result<(), QueueClosed> {
        self.sender.send(message).await.map_err(|_| QueueClosed)
    }

    /// Free slots left in the queue.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }
}

/// Running totals kept by the dispatcher.
#[derive(Debug, Default)]
pub struct DispatchStats {
    messages: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchStatsSnapshot {
    pub messages: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchStatsSnapshot {
        DispatchStatsSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn record(&self, report: &DispatchReport) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        self.delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.failed.fetch_add(report.failed as u64, Ordering::Relaxed);
    }
}

/// Outcome of dispatching one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Write attempts made (one per peer in the room snapshot)
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Single consumer of the broadcast queue.
pub struct BroadcastDispatcher {
    registry: Arc<dyn ConnectionRegistry>,
    receiver: mpsc::Receiver<ChatMessage>,
    write_timeout: Duration,
    stats: Arc<DispatchStats>,
}

impl BroadcastDispatcher {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        receiver: mpsc::Receiver<ChatMessage>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            receiver,
            write_timeout,
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Shared handle to the dispatcher's counters.
    pub fn stats(&self) -> Arc<DispatchStats> {
        self.stats.clone()
    }

    /// Drain the queue until it is closed or `shutdown` fires.
    ///
    /// On shutdown the queue stops accepting new messages, and whatever is
    /// already buffered is still dispatched before returning.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!("Broadcast dispatcher started");
        loop {
            tokio::select! {
                maybe = self.receiver.recv() => match maybe {
                    Some(message) => {
                        self.dispatch(&message).await;
                    }
                    None => break,
                },
                _ = shutdown.cancelled() => {
                    self.receiver.close();
                    while let Some(message) = self.receiver.recv().await {
                        self.dispatch(&message).await;
                    }
                    break;
                }
            }
        }
        tracing::info!(
            "Broadcast dispatcher stopped: {:?}",
            self.stats.snapshot()
        );
    }

    /// Write one message to every connection currently in its room.
    pub async fn dispatch(&self, message: &ChatMessage) -> DispatchReport {
        let frame: Frame = match serde_json::to_string(&ChatMessageDto::from(message)) {
            Ok(json) => json.into(),
            Err(e) => {
                tracing::error!("Failed to serialize message for broadcast: {}", e);
                return DispatchReport::default();
            }
        };

        let peers = self.registry.snapshot(&message.room).await;
        let writes = peers.iter().map(|peer| {
            let frame = frame.clone();
            async move { (peer.id, peer.sender.deliver(frame, self.write_timeout).await) }
        });

        let mut report = DispatchReport {
            attempted: peers.len(),
            ..DispatchReport::default()
        };
        for (peer_id, result) in join_all(writes).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Failed to send message to connection '{}': {}", peer_id, e);
                }
            }
        }

        self.stats.record(&report);
        tracing::debug!(
            "Broadcasted message from '{}' to {} clients in room '{}' ({} failed)",
            message.user,
            report.delivered,
            message.room,
            report.failed
        );
        report
    }
}
