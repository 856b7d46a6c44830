//! WebSocket connection handlers.

use std::{fmt, sync::Arc, time::Duration};

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::{Sink, SinkExt},
    stream::{SplitStream, StreamExt},
};
use tokio::{sync::mpsc, time::timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{
        ClientSender, ConnectionEntry, ConnectionId, ConnectionIdFactory, ConnectionLifecycle,
        ConnectionState, Frame, RoomName,
    },
    ui::state::{AppState, ConnectQuery},
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, SendMessageError,
        SendMessageUseCase,
    },
};

/// Upgrade every request; authentication happens on the socket so that a
/// rejected client still receives a reason frame.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    let tasks = state.tasks.clone();
    ws.on_upgrade(move |socket| tasks.track_future(handle_socket(socket, state, query)))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, query: ConnectQuery) {
    let id = ConnectionIdFactory::generate();
    let write_timeout = state.settings.write_timeout;
    let mut lifecycle = ConnectionLifecycle::new();
    advance(&mut lifecycle, ConnectionState::Authenticating, &id);

    // 1. 認証
    let connect_usecase =
        ConnectParticipantUseCase::new(state.verifier.clone(), state.registry.clone());
    let identity = match connect_usecase.authenticate(query.token.as_deref()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting connection '{}': {}", id, e);
            lifecycle.begin_close();
            reject(&mut socket, e.rejection_message(), write_timeout).await;
            advance(&mut lifecycle, ConnectionState::Closed, &id);
            return;
        }
    };

    let room = match RoomName::resolve(query.room.as_deref(), &state.settings.default_room) {
        Ok(room) => room,
        Err(e) => {
            tracing::warn!("Rejecting connection '{}': {}", id, e);
            lifecycle.begin_close();
            reject(&mut socket, "Invalid room", write_timeout).await;
            advance(&mut lifecycle, ConnectionState::Closed, &id);
            return;
        }
    };

    // 2. Registry に登録
    let (client_tx, client_rx) = ClientSender::channel(state.settings.client_buffer);
    let entry = match connect_usecase.execute(id, identity, room, client_tx).await {
        Ok(entry) => entry,
        Err(e) => {
            tracing::error!("Failed to register connection '{}': {}", id, e);
            lifecycle.begin_close();
            let _ = timeout(write_timeout, socket.send(Message::Close(None))).await;
            advance(&mut lifecycle, ConnectionState::Closed, &id);
            return;
        }
    };
    advance(&mut lifecycle, ConnectionState::Active, &id);
    tracing::info!(
        "'{}' joined room '{}' as connection '{}'",
        entry.identity.username,
        entry.room,
        id
    );

    // 3. 読み込み・書き込みタスク
    let (sender, receiver) = socket.split();
    let mut send_task = tokio::spawn(write_frames(
        sender,
        client_rx,
        write_timeout,
        state.close_connections.clone(),
        id,
    ));
    let send_usecase = SendMessageUseCase::new(state.store.clone(), state.queue.clone());
    let mut recv_task = tokio::spawn(read_frames(receiver, entry, send_usecase, id));

    let reader_ended = tokio::select! {
        _ = &mut recv_task => true,
        _ = &mut send_task => false,
    };

    // 4. 切断（Registry から外してから transport を閉じる）
    lifecycle.begin_close();
    DisconnectParticipantUseCase::new(state.registry.clone())
        .execute(&id)
        .await;
    if reader_ended {
        // The registry held the last sender, so the writer ends once its buffer is flushed
        if timeout(write_timeout, &mut send_task).await.is_err() {
            send_task.abort();
            let _ = send_task.await;
        }
    } else {
        recv_task.abort();
        let _ = recv_task.await;
    }
    advance(&mut lifecycle, ConnectionState::Closed, &id);
}

/// Forward frames queued for this connection to the socket.
///
/// Returns when the queue is closed, a write fails or misses its deadline, or
/// `close` fires. On `close` the frames already buffered are written before
/// the going-away close frame.
async fn write_frames<S>(
    mut sender: S,
    mut rx: mpsc::Receiver<Frame>,
    write_timeout: Duration,
    close: CancellationToken,
    id: ConnectionId,
) where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(frame) => {
                    if !write_frame(&mut sender, &frame, write_timeout, id).await {
                        return;
                    }
                }
                None => return,
            },
            _ = close.cancelled() => {
                while let Ok(frame) = rx.try_recv() {
                    if !write_frame(&mut sender, &frame, write_timeout, id).await {
                        return;
                    }
                }
                let going_away = Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: Utf8Bytes::from_static("Server shutting down"),
                }));
                let _ = timeout(write_timeout, sender.send(going_away)).await;
                return;
            }
        }
    }
}

/// Write one frame under the deadline. Returns `false` if the socket is unusable.
async fn write_frame<S>(
    sender: &mut S,
    frame: &Frame,
    write_timeout: Duration,
    id: ConnectionId,
) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    match timeout(write_timeout, sender.send(Message::Text(Utf8Bytes::from(&**frame)))).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!("Failed to write to connection '{}': {}", id, e);
            false
        }
        Err(_) => {
            tracing::warn!(
                "Write to connection '{}' timed out after {:?}",
                id,
                write_timeout
            );
            false
        }
    }
}

/// Turn incoming text frames into broadcasts until the client goes away.
async fn read_frames(
    mut receiver: SplitStream<WebSocket>,
    entry: ConnectionEntry,
    send_usecase: SendMessageUseCase,
    id: ConnectionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error on connection '{}': {}", id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match send_usecase.execute(&entry, text.as_str()).await {
                Ok(message) => {
                    tracing::debug!("Accepted message from '{}'", message.user);
                }
                Err(SendMessageError::QueueClosed(_)) => {
                    tracing::info!("Broadcast queue closed, ending connection '{}'", id);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        "Dropping frame from '{}': {}",
                        entry.identity.username,
                        e
                    );
                }
            },
            Message::Binary(_) => {
                tracing::debug!("Ignoring binary frame on connection '{}'", id);
            }
            Message::Close(_) => {
                tracing::info!("'{}' requested close", entry.identity.username);
                break;
            }
            // Ping/pong is handled automatically by the WebSocket protocol
            _ => {}
        }
    }
}

/// Send the rejection reason, then a policy-violation close frame.
async fn reject(socket: &mut WebSocket, reason: &'static str, write_timeout: Duration) {
    let _ = timeout(
        write_timeout,
        socket.send(Message::Text(Utf8Bytes::from_static(reason))),
    )
    .await;
    let close = Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: Utf8Bytes::from_static(reason),
    }));
    let _ = timeout(write_timeout, socket.send(close)).await;
}

fn advance(lifecycle: &mut ConnectionLifecycle, next: ConnectionState, id: &ConnectionId) {
    match lifecycle.transition(next) {
        Ok(()) => tracing::trace!("Connection '{}' is {:?}", id, lifecycle.state()),
        Err(e) => tracing::error!("Connection '{}': {}", id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_write_frames_flushes_buffer_before_closing() {
        // テスト項目: close 発火時、バッファ済みのフレームを書き切ってから 1001 で閉じる
        // given (前提条件):
        let (client, rx) = ClientSender::channel(4);
        client.deliver(Frame::from("one"), WRITE_TIMEOUT).await.unwrap();
        client.deliver(Frame::from("two"), WRITE_TIMEOUT).await.unwrap();
        let close = CancellationToken::new();
        close.cancel();
        let mut written: Vec<Message> = Vec::new();

        // when (操作):
        write_frames(
            &mut written,
            rx,
            WRITE_TIMEOUT,
            close,
            ConnectionIdFactory::generate(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(written.len(), 3);
        assert!(matches!(&written[0], Message::Text(text) if text.as_str() == "one"));
        assert!(matches!(&written[1], Message::Text(text) if text.as_str() == "two"));
        assert!(matches!(
            &written[2],
            Message::Close(Some(frame)) if frame.code == close_code::AWAY
        ));
        drop(client);
    }

    #[tokio::test]
    async fn test_write_frames_ends_after_last_sender_dropped() {
        // テスト項目: 送信側が全て drop されると残りを書き切って終了する（close フレームなし）
        // given (前提条件):
        let (client, rx) = ClientSender::channel(4);
        client.deliver(Frame::from("last"), WRITE_TIMEOUT).await.unwrap();
        drop(client);
        let mut written: Vec<Message> = Vec::new();

        // when (操作):
        write_frames(
            &mut written,
            rx,
            WRITE_TIMEOUT,
            CancellationToken::new(),
            ConnectionIdFactory::generate(),
        )
        .await;

        // then (期待する結果):
        assert_eq!(written.len(), 1);
        assert!(matches!(&written[0], Message::Text(text) if text.as_str() == "last"));
    }
}
