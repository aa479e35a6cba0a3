//! Integration tests for realtime token updates against a local socket server.

use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use supabase_rs::{RealtimeAuth, RealtimeClient, RealtimeClientOptions};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Accepts one socket and forwards every text frame it receives
async fn start_server() -> (String, mpsc::UnboundedReceiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                let value: Value = serde_json::from_str(&text).unwrap();
                if tx.send(value).is_err() {
                    break;
                }
            }
        }
    });

    (format!("ws://{}/realtime/v1", addr), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Value>, event: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let message = rx.recv().await.expect("server closed");
            if message["event"] == event {
                return message;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no '{}' message received", event))
}

async fn joined_client(
    initial_token: &str,
) -> (RealtimeClient, mpsc::UnboundedReceiver<Value>, Value) {
    let (url, mut rx) = start_server().await;
    let client = RealtimeClient::new(
        url,
        RealtimeClientOptions {
            api_key: "anon".to_string(),
            access_token: Some(initial_token.to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let channel = client.channel("room", Default::default()).await;
    client.connect().await.unwrap();
    channel.subscribe().await.unwrap();

    let join = next_event(&mut rx, "phx_join").await;
    (client, rx, join)
}

#[tokio::test]
async fn test_join_carries_current_token() {
    let (_client, _rx, join) = joined_client("initial-jwt").await;

    assert_eq!(join["topic"], "realtime:room");
    assert_eq!(join["payload"]["access_token"], "initial-jwt");
}

#[tokio::test]
async fn test_set_auth_pushes_to_joined_channel() {
    let (client, mut rx, join) = joined_client("initial-jwt").await;

    client.set_auth("fresh-jwt");

    let push = next_event(&mut rx, "access_token").await;
    assert_eq!(push["topic"], "realtime:room");
    assert_eq!(push["payload"]["access_token"], "fresh-jwt");
    assert_eq!(push["join_ref"], join["join_ref"]);
    assert_eq!(client.access_token().as_deref(), Some("fresh-jwt"));
}

#[tokio::test]
async fn test_rapid_updates_end_with_latest_token() {
    let (client, mut rx, _join) = joined_client("initial-jwt").await;

    for round in 0..10 {
        let tokens: Vec<String> = (0..5).map(|i| format!("r{}-t{}", round, i)).collect();
        for token in &tokens {
            client.set_auth(token);
        }
        let latest = tokens.last().unwrap();

        // Pushes may be coalesced, but they arrive in order and stop at the latest
        let mut pushed = Vec::new();
        while pushed.last() != Some(latest) {
            let push = next_event(&mut rx, "access_token").await;
            pushed.push(push["payload"]["access_token"].as_str().unwrap().to_string());
        }
        let positions: Vec<usize> = pushed
            .iter()
            .map(|t| tokens.iter().position(|candidate| candidate == t).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", pushed);

        tokio::time::sleep(Duration::from_millis(50)).await;
        while let Ok(extra) = rx.try_recv() {
            assert_ne!(extra["event"], "access_token", "stale push after {}: {}", latest, extra);
        }
        assert_eq!(client.access_token().as_deref(), Some(latest.as_str()));
    }
}
