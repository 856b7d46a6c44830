//! HTTP API integration tests.
//!
//! Tests for REST API endpoints (health check, history, room list, stats).

mod fixtures;

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

use fixtures::{ALICE, BOB, CAROL, TestServer, next_json};

#[tokio::test]
async fn test_health_endpoint() {
    // テスト項目: /api/health エンドポイントが正常に動作する
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!("{}/api/health", server.base_url()))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_history_returns_most_recent_oldest_first() {
    // テスト項目: /api/messages が最新 N 件を古い順で返す
    // given (前提条件): general に m1, m2, m3 が送られている
    let server = TestServer::start().await;
    let mut alice = server.join(ALICE, None).await;
    for text in ["m1", "m2", "m3"] {
        alice
            .send(Message::text(format!(r#"{{"text":"{text}"}}"#)))
            .await
            .expect("Failed to send message");
        assert_eq!(next_json(&mut alice).await["text"], text);
    }
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .get(format!(
            "{}/api/messages?room=general&limit=2",
            server.base_url()
        ))
        .send()
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    let messages = body.as_array().expect("Response should be an array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "m2");
    assert_eq!(messages[1]["text"], "m3");
    assert_eq!(messages[0]["user"], "alice");
    assert_eq!(messages[0]["room"], "general");
    assert!(messages[0]["timestamp"].is_string());
}

#[tokio::test]
async fn test_history_is_room_scoped() {
    // テスト項目: ルーム指定の履歴には他ルームのメッセージが含まれない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join(ALICE, Some("general")).await;
    let mut carol = server.join(CAROL, Some("dev")).await;
    alice.send(Message::text(r#"{"text":"in general"}"#)).await.unwrap();
    next_json(&mut alice).await;
    carol.send(Message::text(r#"{"text":"in dev"}"#)).await.unwrap();
    next_json(&mut carol).await;

    // when (操作):
    let dev: serde_json::Value = reqwest::get(format!("{}/api/messages?room=dev", server.base_url()))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");
    let all: serde_json::Value = reqwest::get(format!("{}/api/messages", server.base_url()))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    // then (期待する結果):
    let dev = dev.as_array().unwrap();
    assert_eq!(dev.len(), 1);
    assert_eq!(dev[0]["text"], "in dev");
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_history_rejects_invalid_room() {
    // テスト項目: 長すぎるルーム名は 400 を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let room = "r".repeat(101);

    // when (操作):
    let response = reqwest::get(format!("{}/api/messages?room={room}", server.base_url()))
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_rooms_list_endpoint() {
    // テスト項目: /api/rooms エンドポイントが接続中のルームと人数を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.join(ALICE, None).await;
    let _bob = server.join(BOB, Some("general")).await;
    let _carol = server.join(CAROL, Some("dev")).await;

    // when (操作):
    let response = reqwest::get(format!("{}/api/rooms", server.base_url()))
        .await
        .expect("Failed to send request");

    // then (期待する結果):
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert!(body.is_array(), "Response should be an array");
    assert_eq!(
        body,
        serde_json::json!([
            {"room": "dev", "members": 1},
            {"room": "general", "members": 2},
        ])
    );
}

#[tokio::test]
async fn test_stats_endpoint() {
    // テスト項目: /api/stats が接続数と配信数を返す
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.join(ALICE, None).await;
    let mut bob = server.join(BOB, None).await;
    alice.send(Message::text(r#"{"text":"hi"}"#)).await.unwrap();
    next_json(&mut alice).await;
    next_json(&mut bob).await;

    // when (操作): 配信結果の記録は書き込み完了の直後なので、反映されるまで待つ
    let mut stats = server.stats().await;
    for _ in 0..50 {
        if stats["messages"] == 1 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        stats = server.stats().await;
    }

    // then (期待する結果):
    assert_eq!(stats["connections"], 2);
    assert_eq!(stats["rooms"], 1);
    assert_eq!(stats["messages"], 1);
    assert_eq!(stats["delivered"], 2);
    assert_eq!(stats["failed"], 0);
    assert_eq!(stats["queue_available"], 256);
}
