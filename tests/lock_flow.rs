//! End-to-end lock coordination over real WebSocket connections.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use tarot_api::lifecycle::Shutdown;

mod common;
use common::test_server;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// Boot a server on an ephemeral port; returns its address and a valid
/// session token.
async fn start_server() -> (SocketAddr, String) {
    let (server, _, _) = test_server(false);
    let token = server.state().sessions.create();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server.run(listener, Arc::new(Shutdown::new())).await.unwrap();
    });
    (addr, token)
}

async fn connect(addr: SocketAddr, token: &str, owner: &str) -> WsClient {
    let mut request = format!("ws://{addr}/api/v1/translations/ws")
        .into_client_request()
        .unwrap();
    request.headers_mut().insert(
        "Cookie",
        format!("session={token}; WS_SESSION={owner}").parse().unwrap(),
    );
    let (stream, _) = tokio::time::timeout(WAIT, tokio_tungstenite::connect_async(request))
        .await
        .unwrap()
        .unwrap();
    stream
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(client: &mut WsClient) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(WAIT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .unwrap();
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send(client: &mut WsClient, payload: &str) {
    client.send(Message::Text(payload.into())).await.unwrap();
}

#[tokio::test]
async fn test_upgrade_requires_session() {
    let (addr, _token) = start_server().await;
    let request = format!("ws://{addr}/api/v1/translations/ws")
        .into_client_request()
        .unwrap();
    let error = tokio_tungstenite::connect_async(request).await.unwrap_err();
    let tokio_tungstenite::tungstenite::Error::Http(response) = error else {
        panic!("expected an HTTP rejection");
    };
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_init_snapshot_on_open() {
    let (addr, token) = start_server().await;
    let mut client = connect(addr, &token, "owner-a").await;
    let init = next_json(&mut client).await;
    assert_eq!(init["type"], "init");
    assert_eq!(init["locks"], serde_json::json!({}));
}

#[tokio::test]
async fn test_lock_contention_and_disconnect_release() {
    let (addr, token) = start_server().await;

    // A connects and locks the key.
    let mut a = connect(addr, &token, "owner-a").await;
    assert_eq!(next_json(&mut a).await["type"], "init");
    send(&mut a, r#"{"type":"lock","key":"card.title","id":"owner-a"}"#).await;
    let locked = next_json(&mut a).await;
    assert_eq!(locked["type"], "lock");
    assert_eq!(locked["id"], "owner-a");

    // B joins late and sees the lock in its snapshot.
    let mut b = connect(addr, &token, "owner-b").await;
    let init = next_json(&mut b).await;
    assert_eq!(init["locks"]["card.title"], "owner-a");

    // B's claim is denied; A still owns the key.
    send(&mut b, r#"{"type":"lock","key":"card.title","id":"owner-b"}"#).await;
    let denied = next_json(&mut b).await;
    assert_eq!(denied["type"], "lock-denied");
    assert_eq!(denied["key"], "card.title");

    // A disconnects; its locks are freed and broadcast.
    a.close(None).await.unwrap();
    let released = next_json(&mut b).await;
    assert_eq!(released["type"], "release");
    assert_eq!(released["key"], "card.title");

    // Now B can claim it.
    send(&mut b, r#"{"type":"lock","key":"card.title","id":"owner-b"}"#).await;
    let locked = next_json(&mut b).await;
    assert_eq!(locked["type"], "lock");
    assert_eq!(locked["id"], "owner-b");
}

#[tokio::test]
async fn test_release_all_frees_every_key() {
    let (addr, token) = start_server().await;

    let mut a = connect(addr, &token, "owner-a").await;
    assert_eq!(next_json(&mut a).await["type"], "init");
    send(&mut a, r#"{"type":"lock","key":"one","id":"owner-a"}"#).await;
    assert_eq!(next_json(&mut a).await["type"], "lock");
    send(&mut a, r#"{"type":"lock","key":"two","id":"owner-a"}"#).await;
    assert_eq!(next_json(&mut a).await["type"], "lock");

    send(&mut a, r#"{"type":"release-all","id":"owner-a"}"#).await;
    let mut freed = vec![
        next_json(&mut a).await["key"].as_str().unwrap().to_string(),
        next_json(&mut a).await["key"].as_str().unwrap().to_string(),
    ];
    freed.sort();
    assert_eq!(freed, vec!["one", "two"]);
}

#[tokio::test]
async fn test_release_of_foreign_lock_is_denied() {
    let (addr, token) = start_server().await;

    let mut a = connect(addr, &token, "owner-a").await;
    assert_eq!(next_json(&mut a).await["type"], "init");
    send(&mut a, r#"{"type":"lock","key":"k","id":"owner-a"}"#).await;
    assert_eq!(next_json(&mut a).await["type"], "lock");

    let mut b = connect(addr, &token, "owner-b").await;
    assert_eq!(next_json(&mut b).await["type"], "init");
    send(&mut b, r#"{"type":"release","key":"k","id":"owner-b"}"#).await;
    let denied = next_json(&mut b).await;
    assert_eq!(denied["type"], "release-denied");
    assert_eq!(denied["key"], "k");
}

#[tokio::test]
async fn test_malformed_message_gets_error_reply() {
    let (addr, token) = start_server().await;
    let mut client = connect(addr, &token, "owner-a").await;
    assert_eq!(next_json(&mut client).await["type"], "init");

    send(&mut client, r#"{"type":"steal","key":"k"}"#).await;
    let error = next_json(&mut client).await;
    assert_eq!(error["type"], "error");

    send(&mut client, "not json at all").await;
    let error = next_json(&mut client).await;
    assert_eq!(error["type"], "error");
}
