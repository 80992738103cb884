//! Broadcast fan-out to connected editors.
//!
//! # Responsibilities
//! - Hold the live set of WebSocket subscribers for the one logical channel
//! - Publish serialized events to all of them
//!
//! # Design Decisions
//! - Built on `tokio::sync::broadcast`: subscription and publication are
//!   safe against concurrent connect/disconnect without copy-on-iterate
//! - Delivery is best-effort and fire-and-forget; a send with no receivers
//!   or a lagging receiver is not an error and nothing is retried or queued
//!   for disconnected clients

use tokio::sync::broadcast;

use super::protocol::ServerMessage;
use crate::observability::metrics;

const CHANNEL_CAPACITY: usize = 256;

/// Fan-out hub for the single "BROADCAST" channel.
#[derive(Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<String>,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe a new connection. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        let rx = self.tx.subscribe();
        metrics::record_ws_connections(self.tx.receiver_count());
        rx
    }

    /// Serialize and fan a message out to every subscriber. Fire-and-forget:
    /// the result of the send is deliberately ignored.
    pub fn publish(&self, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(payload) => {
                let _ = self.tx.send(payload);
            }
            Err(error) => {
                // Serialization of our own message types failing would be a
                // programming error; log it rather than crash the caller.
                tracing::error!(%error, "failed to serialize broadcast message");
            }
        }
    }

    /// Number of currently subscribed connections.
    pub fn connections(&self) -> usize {
        self.tx.receiver_count()
    }
}
