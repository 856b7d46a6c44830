//! Shared helpers for integration tests: an in-process relay on a free port.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use chatrelay_server::{Server, ServerConfig, ServerError};
use clap::Parser;
use futures_util::StreamExt;
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Tokens accepted by every test server
pub const ALICE: &str = "t-alice";
pub const BOB: &str = "t-bob";
pub const CAROL: &str = "t-carol";

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestServer {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    /// Start with extra command line arguments.
    pub async fn start_with(extra: &[&str]) -> Self {
        let mut argv = vec![
            "chatrelay-server",
            "--host",
            "127.0.0.1",
            "--port",
            "0",
            "--store",
            "memory",
            "--static-token",
            "t-alice:1:alice",
            "--static-token",
            "t-bob:2:bob",
            "--static-token",
            "t-carol:3:carol",
        ];
        argv.extend_from_slice(extra);
        let mut config = ServerConfig::try_parse_from(argv).expect("Failed to parse config");
        config.jwt_secret = None;

        let server = Server::bind(&config).await.expect("Failed to bind server");
        let addr = server.local_addr().expect("Failed to get local address");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async move {
            let _ = stop_rx.await;
        }));

        Self {
            addr,
            stop: Some(stop_tx),
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, token: Option<&str>, room: Option<&str>) -> String {
        let mut params = Vec::new();
        if let Some(token) = token {
            params.push(format!("token={token}"));
        }
        if let Some(room) = room {
            params.push(format!("room={room}"));
        }
        format!("ws://{}/ws?{}", self.addr, params.join("&"))
    }

    /// Open a WebSocket connection and wait until the server has registered it.
    pub async fn join(&self, token: &str, room: Option<&str>) -> WsStream {
        let before = self.connections().await;
        let ws = self.connect(Some(token), room).await;
        self.wait_for_connections(before + 1).await;
        ws
    }

    /// Open a WebSocket connection without waiting for registration.
    pub async fn connect(&self, token: Option<&str>, room: Option<&str>) -> WsStream {
        let (ws, _) = tokio_tungstenite::connect_async(self.ws_url(token, room))
            .await
            .expect("Failed to connect to WebSocket");
        ws
    }

    pub async fn stats(&self) -> serde_json::Value {
        reqwest::get(format!("{}/api/stats", self.base_url()))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON")
    }

    pub async fn connections(&self) -> u64 {
        self.stats().await["connections"]
            .as_u64()
            .expect("connections should be a number")
    }

    /// Poll until the registry holds exactly `expected` connections.
    pub async fn wait_for_connections(&self, expected: u64) {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
        loop {
            let current = self.connections().await;
            if current == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {expected} connections, still {current}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
    }
}

/// Next non-control message, or `None` if the stream ended or nothing arrived in time.
pub async fn next_message(ws: &mut WsStream, wait: Duration) -> Option<Message> {
    loop {
        match tokio::time::timeout(wait, ws.next()).await {
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => continue,
            Ok(Some(Ok(msg))) => return Some(msg),
            Ok(Some(Err(_)) | None) | Err(_) => return None,
        }
    }
}

/// Next text frame parsed as JSON; panics if none arrives in time.
pub async fn next_json(ws: &mut WsStream) -> serde_json::Value {
    match next_message(ws, RECV_TIMEOUT).await {
        Some(Message::Text(text)) => {
            serde_json::from_str(text.as_str()).expect("Failed to parse frame as JSON")
        }
        other => panic!("expected a text frame, got {other:?}"),
    }
}

/// Assert that no text frame arrives within `wait`.
pub async fn assert_silent(ws: &mut WsStream, wait: Duration) {
    if let Some(Message::Text(text)) = next_message(ws, wait).await {
        panic!("expected no frame, got {text}");
    }
}
