//! Wire messages for the editor WebSocket channel.
//!
//! The shapes here are the protocol contract with the editor front-end:
//! internally tagged JSON with a `type` discriminator. `UPDATE` and `IMPORT`
//! keep their historical uppercase tags.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::translations::Translations;

/// Messages sent by an editor client.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Claim or renew the lock on one translation key.
    #[serde(rename = "lock")]
    Lock { key: String, id: String },

    /// Give up the lock on one translation key.
    #[serde(rename = "release")]
    Release { key: String, id: String },

    /// Give up every lock held by this editor.
    #[serde(rename = "release-all")]
    ReleaseAll { id: String },
}

/// Messages sent by the server, either to one socket (init, denials,
/// errors) or broadcast to all (everything else).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Snapshot of current lock owners, sent once on connection open so a
    /// late joiner reconstructs lock state without an event log.
    #[serde(rename = "init")]
    Init { locks: HashMap<String, String> },

    #[serde(rename = "lock")]
    Locked { key: String, id: String },

    #[serde(rename = "lock-denied")]
    LockDenied { key: String, id: String },

    #[serde(rename = "release")]
    Released { key: String },

    #[serde(rename = "release-denied")]
    ReleaseDenied { key: String, id: String },

    /// One translation string changed.
    #[serde(rename = "UPDATE")]
    Update {
        key: String,
        lang: String,
        message: String,
        locks: HashMap<String, String>,
    },

    /// A bulk import replaced the key set. `translations` is omitted when
    /// the import failed and only the pruned lock snapshot is authoritative.
    #[serde(rename = "IMPORT")]
    Import {
        #[serde(skip_serializing_if = "Option::is_none")]
        translations: Option<Translations>,
        locks: HashMap<String, String>,
    },

    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lock_message() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"lock","key":"card.title","id":"a"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Lock {
                key: "card.title".into(),
                id: "a".into()
            }
        );
    }

    #[test]
    fn test_parse_release_all() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"release-all","id":"a"}"#).unwrap();
        assert_eq!(msg, ClientMessage::ReleaseAll { id: "a".into() });
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"steal","key":"k"}"#).is_err());
    }

    #[test]
    fn test_init_shape() {
        let mut locks = HashMap::new();
        locks.insert("card.title".to_string(), "a".to_string());
        let json = serde_json::to_value(ServerMessage::Init { locks }).unwrap();
        assert_eq!(json["type"], "init");
        assert_eq!(json["locks"]["card.title"], "a");
    }

    #[test]
    fn test_denial_shape() {
        let json = serde_json::to_value(ServerMessage::LockDenied {
            key: "k".into(),
            id: "b".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "lock-denied");
        assert_eq!(json["key"], "k");
        assert_eq!(json["id"], "b");
    }

    #[test]
    fn test_import_omits_missing_translations() {
        let json = serde_json::to_value(ServerMessage::Import {
            translations: None,
            locks: HashMap::new(),
        })
        .unwrap();
        assert_eq!(json["type"], "IMPORT");
        assert!(json.get("translations").is_none());
    }
}
