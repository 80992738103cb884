//! Per-connection WebSocket task.
//!
//! # Responsibilities
//! - Send the `init` lock snapshot on open
//! - Forward hub broadcasts to the socket
//! - Drive the lock table from inbound client messages
//! - Release the connection's locks on close
//!
//! # Design Decisions
//! - Denials and parse errors go only to the offending socket; successful
//!   transitions are broadcast (the originator hears its own event back,
//!   which is the acknowledgement)
//! - Send failures end the connection; the hub never retries
//! - A lagged broadcast receiver skips ahead instead of disconnecting; the
//!   client resyncs from subsequent events

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use super::protocol::{ClientMessage, ServerMessage};
use crate::http::server::AppState;
use crate::observability::metrics;

type Sink = SplitSink<WebSocket, Message>;

/// Send one message to this socket only. Fire-and-forget apart from the
/// returned liveness: an Err means the connection is gone.
async fn send_direct(sink: &mut Sink, message: &ServerMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(payload) => sink.send(Message::Text(payload.into())).await,
        Err(error) => {
            tracing::error!(%error, "failed to serialize direct message");
            Ok(())
        }
    }
}

async fn handle_message(sink: &mut Sink, state: &AppState, raw: &str) {
    let message = match serde_json::from_str::<ClientMessage>(raw) {
        Ok(message) => message,
        Err(_) => {
            let _ = send_direct(
                sink,
                &ServerMessage::Error {
                    message: "Invalid message type".to_string(),
                },
            )
            .await;
            return;
        }
    };

    match message {
        ClientMessage::Lock { key, id } => {
            if state.locks.lock(&key, &id) {
                state.hub.publish(&ServerMessage::Locked { key, id });
            } else {
                let _ = send_direct(sink, &ServerMessage::LockDenied { key, id }).await;
            }
        }
        ClientMessage::Release { key, id } => {
            if state.locks.release(&key, &id) {
                state.hub.publish(&ServerMessage::Released { key });
            } else {
                let _ = send_direct(sink, &ServerMessage::ReleaseDenied { key, id }).await;
            }
        }
        ClientMessage::ReleaseAll { id } => {
            for key in state.locks.release_by_id(&id) {
                state.hub.publish(&ServerMessage::Released { key });
            }
        }
    }
}

/// Run one editor connection until it closes, then free its locks.
pub async fn run_connection(socket: WebSocket, owner_id: String, state: AppState) {
    tracing::debug!(owner = %owner_id, "editor connected");
    let mut rx = state.hub.subscribe();
    let (mut sink, mut stream) = socket.split();

    let init = ServerMessage::Init {
        locks: state.locks.owners(),
    };
    if send_direct(&mut sink, &init).await.is_ok() {
        loop {
            tokio::select! {
                broadcast = rx.recv() => match broadcast {
                    Ok(payload) => {
                        if sink.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(owner = %owner_id, skipped, "connection lagged behind broadcasts");
                    }
                    Err(RecvError::Closed) => break,
                },
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_message(&mut sink, &state, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Ping/pong is answered by the transport.
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                },
            }
        }
    }

    drop(rx);
    metrics::record_ws_connections(state.hub.connections());

    // Free everything this editor held so a crashed or closed tab does not
    // starve a key until the TTL sweep.
    for key in state.locks.release_by_id(&owner_id) {
        state.hub.publish(&ServerMessage::Released { key });
    }
    tracing::debug!(owner = %owner_id, "editor disconnected");
}
