//! In-process translation storage.
//!
//! # Design Decisions
//! - One mutex guards both maps; operations are short and never await while
//!   holding the guard
//! - Passwords are stored as salted SHA-256 digests; anything stronger is a
//!   storage-backend concern, not this crate's

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{
    Extracted, StoreError, Translation, TranslationRecord, TranslationStore, Translations,
};

fn hash_password(login: &str, password: &str) -> String {
    // Login doubles as the salt: one digest per account.
    let digest = Sha256::new()
        .chain_update(login.as_bytes())
        .chain_update(b":")
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Default)]
struct Inner {
    translations: Translations,
    users: HashMap<String, String>,
}

/// In-memory implementation of [`TranslationStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn get(&self) -> Result<Translations, StoreError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.translations.clone())
    }

    async fn add(&self, key: &str, translation: Translation) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let record = inner
            .translations
            .get_mut(key)
            .ok_or_else(|| StoreError::UnknownKey(key.to_string()))?;
        record.set_message(&translation.lang, &translation.message);
        Ok(())
    }

    async fn import(&self, lang: &str, extracted: Extracted) -> Result<Translations, StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        for (key, message) in &extracted {
            let record = inner
                .translations
                .entry(key.clone())
                .or_insert_with(TranslationRecord::empty);
            record.description = message.description.clone().unwrap_or_default();
            record.set_message(lang, &message.default_message);
        }
        // Keys missing from the extraction no longer exist in the client.
        inner.translations.retain(|key, _| extracted.contains_key(key));
        Ok(inner.translations.clone())
    }

    async fn upsert_user(&self, login: &str, password: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .users
            .insert(login.to_string(), hash_password(login, password));
        Ok(())
    }

    async fn authenticate(&self, login: &str, password: &str) -> Result<bool, StoreError> {
        if login.is_empty() || password.is_empty() {
            return Ok(false);
        }
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .users
            .get(login)
            .is_some_and(|stored| *stored == hash_password(login, password)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(pairs: &[(&str, &str)]) -> Extracted {
        pairs
            .iter()
            .map(|(key, message)| {
                (
                    (*key).to_string(),
                    super::super::ExtractedMessage {
                        default_message: (*message).to_string(),
                        description: None,
                    },
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_add_unknown_key_fails() {
        let store = MemoryStore::new();
        let result = store
            .add(
                "missing",
                Translation {
                    lang: "en".into(),
                    message: "hi".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::UnknownKey(_))));
    }

    #[tokio::test]
    async fn test_import_then_add() {
        let store = MemoryStore::new();
        store
            .import("en", extracted(&[("card.title", "The Fool")]))
            .await
            .unwrap();
        store
            .add(
                "card.title",
                Translation {
                    lang: "ru".into(),
                    message: "Дурак".into(),
                },
            )
            .await
            .unwrap();

        let all = store.get().await.unwrap();
        let record = all.get("card.title").unwrap();
        assert!(record
            .translations
            .iter()
            .any(|t| t.lang == "ru" && t.message == "Дурак"));
        assert!(record
            .translations
            .iter()
            .any(|t| t.lang == "en" && t.message == "The Fool"));
    }

    #[tokio::test]
    async fn test_import_drops_absent_keys() {
        let store = MemoryStore::new();
        store
            .import("en", extracted(&[("kept", "a"), ("removed", "b")]))
            .await
            .unwrap();
        let after = store.import("en", extracted(&[("kept", "a")])).await.unwrap();
        assert!(after.contains_key("kept"));
        assert!(!after.contains_key("removed"));
    }

    #[tokio::test]
    async fn test_import_preserves_other_languages() {
        let store = MemoryStore::new();
        store
            .import("en", extracted(&[("k", "hello")]))
            .await
            .unwrap();
        store
            .add(
                "k",
                Translation {
                    lang: "ru".into(),
                    message: "привет".into(),
                },
            )
            .await
            .unwrap();
        let after = store.import("en", extracted(&[("k", "hello v2")])).await.unwrap();
        let record = after.get("k").unwrap();
        assert!(record
            .translations
            .iter()
            .any(|t| t.lang == "ru" && t.message == "привет"));
        assert!(record
            .translations
            .iter()
            .any(|t| t.lang == "en" && t.message == "hello v2"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = MemoryStore::new();
        store.upsert_user("admin", "secret").await.unwrap();
        assert!(store.authenticate("admin", "secret").await.unwrap());
        assert!(!store.authenticate("admin", "wrong").await.unwrap());
        assert!(!store.authenticate("nobody", "secret").await.unwrap());
        assert!(!store.authenticate("", "").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_replaces_password() {
        let store = MemoryStore::new();
        store.upsert_user("admin", "old").await.unwrap();
        store.upsert_user("admin", "new").await.unwrap();
        assert!(!store.authenticate("admin", "old").await.unwrap());
        assert!(store.authenticate("admin", "new").await.unwrap());
    }
}
