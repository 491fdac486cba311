//! End-to-end tests over a real WebSocket connection.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use chatrelay::config::ServerConfig;
use chatrelay::WebServer;

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Boot a server on a random port.
async fn boot_server() -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
    };
    WebServer::new(&config)
        .unwrap()
        .run_with_addr()
        .await
        .unwrap()
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    ws
}

async fn send(ws: &mut WsStream, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

/// Read frames until one with the given `type` arrives.
async fn recv_type(ws: &mut WsStream, kind: &str) -> Value {
    timeout(TIMEOUT, async {
        loop {
            let msg = ws.next().await.expect("stream ended").expect("ws error");
            if !msg.is_text() {
                continue;
            }
            let value: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
            if value["type"] == kind {
                return value;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind}"))
}

/// Identify and wait until the roster shows `expected` users.
async fn identify(ws: &mut WsStream, name: &str, expected: u64) {
    send(ws, json!({"type": "identify", "name": name})).await;
    loop {
        let roster = recv_type(ws, "user_list").await;
        if roster["count"] == expected {
            return;
        }
    }
}

#[tokio::test]
async fn test_ping_pong() {
    let addr = boot_server().await;
    let mut ws = connect(addr).await;

    send(&mut ws, json!({"type": "ping"})).await;
    let pong = recv_type(&mut ws, "pong").await;
    assert_eq!(pong, json!({"type": "pong"}));
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    let addr = boot_server().await;
    let mut ws = connect(addr).await;

    ws.send(Message::text("{not json")).await.unwrap();
    send(&mut ws, json!({"type": "bogus"})).await;
    send(&mut ws, json!({"type": "ping"})).await;

    recv_type(&mut ws, "pong").await;
}

#[tokio::test]
async fn test_identify_and_global_message() {
    let addr = boot_server().await;
    let mut alice = connect(addr).await;
    identify(&mut alice, "alice", 1).await;
    let mut bob = connect(addr).await;
    identify(&mut bob, "bob", 2).await;

    let roster = recv_type(&mut alice, "user_list").await;
    assert_eq!(roster["count"], 2);

    send(&mut bob, json!({"type": "message", "text": "hello all"})).await;

    for ws in [&mut alice, &mut bob] {
        let msg = recv_type(ws, "message").await;
        assert_eq!(msg["sender"], "bob");
        assert_eq!(msg["text"], "hello all");
        assert!(msg["timestamp"].is_i64());
    }
}

#[tokio::test]
async fn test_room_message_and_legacy_private_message() {
    let addr = boot_server().await;
    let mut alice = connect(addr).await;
    identify(&mut alice, "alice", 1).await;
    let mut bob = connect(addr).await;
    send(&mut bob, json!({"type": "set_username", "username": "bob"})).await;
    recv_type(&mut bob, "user_joined").await;

    send(&mut alice, json!({"type": "join_room", "room": "r1"})).await;
    let notice = recv_type(&mut alice, "system_message").await;
    assert_eq!(notice["text"], "alice joined r1");

    send(&mut bob, json!({"type": "join_room", "room": "r1"})).await;
    let notice = recv_type(&mut bob, "system_message").await;
    assert_eq!(notice["text"], "bob joined r1");

    send(&mut alice, json!({"type": "message", "text": "hi", "room": "r1"})).await;
    let msg = recv_type(&mut bob, "room_message").await;
    assert_eq!(msg["sender"], "alice");
    assert_eq!(msg["text"], "hi");
    assert_eq!(msg["room"], "r1");

    send(
        &mut alice,
        json!({"type": "private_message", "toUsername": "bob", "text": "hey"}),
    )
    .await;
    let incoming = recv_type(&mut bob, "private_message").await;
    let sent = recv_type(&mut alice, "private_message_sent").await;
    assert_eq!(incoming["from"], "alice");
    assert_eq!(incoming["to"], "bob");
    assert_eq!(incoming["text"], "hey");
    assert_eq!(incoming["timestamp"], sent["timestamp"]);
}

#[tokio::test]
async fn test_close_announces_user_left() {
    let addr = boot_server().await;
    let mut alice = connect(addr).await;
    identify(&mut alice, "alice", 1).await;
    let mut bob = connect(addr).await;
    identify(&mut bob, "bob", 2).await;

    bob.close(None).await.unwrap();

    let left = recv_type(&mut alice, "user_left").await;
    assert_eq!(left["name"], "bob");
    let roster = recv_type(&mut alice, "user_list").await;
    assert_eq!(roster["count"], 1);
    assert_eq!(roster["users"][0]["name"], "alice");
}

#[tokio::test]
async fn test_user_not_found() {
    let addr = boot_server().await;
    let mut alice = connect(addr).await;
    identify(&mut alice, "alice", 1).await;

    send(
        &mut alice,
        json!({"type": "private_message", "target": "ghost", "text": "boo"}),
    )
    .await;

    let miss = recv_type(&mut alice, "user_not_found").await;
    assert_eq!(miss, json!({"type": "user_not_found", "target": "ghost"}));
}
