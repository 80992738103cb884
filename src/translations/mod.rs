//! Translation persistence collaborator.
//!
//! The editor core talks to storage through the narrow [`TranslationStore`]
//! interface; the actual backend is out of scope here, so the crate ships
//! the in-process [`store::MemoryStore`].

pub mod store;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::MemoryStore;

/// Languages the editor and content API serve.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ru"];
pub const DEFAULT_LANGUAGE: &str = "en";

/// One translated message in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub lang: String,
    pub message: String,
}

/// All translations of one key, plus the extracted description shown to
/// editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub description: String,
    pub translations: Vec<Translation>,
}

impl TranslationRecord {
    /// A fresh record carries one empty message per supported language.
    pub fn empty() -> Self {
        Self {
            description: String::new(),
            translations: SUPPORTED_LANGUAGES
                .iter()
                .map(|lang| Translation {
                    lang: (*lang).to_string(),
                    message: String::new(),
                })
                .collect(),
        }
    }

    /// Set the message for `lang`, replacing an existing entry or appending
    /// a new one.
    pub fn set_message(&mut self, lang: &str, message: &str) {
        for t in &mut self.translations {
            if t.lang == lang {
                t.message = message.to_string();
                return;
            }
        }
        self.translations.push(Translation {
            lang: lang.to_string(),
            message: message.to_string(),
        });
    }
}

/// Full key → record map.
pub type Translations = HashMap<String, TranslationRecord>;

/// One source string extracted from the client codebase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMessage {
    pub default_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of a bulk import: key → extracted source string.
pub type Extracted = HashMap<String, ExtractedMessage>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("translation key {0:?} not found")]
    UnknownKey(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Narrow persistence interface the dispatcher and handlers depend on.
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// The full translations map.
    async fn get(&self) -> Result<Translations, StoreError>;

    /// Update one message of an existing key. Unknown keys are an error:
    /// keys only enter the system through imports.
    async fn add(&self, key: &str, translation: Translation) -> Result<(), StoreError>;

    /// Merge-import extracted source strings for one language and drop keys
    /// absent from the extraction. Returns the resulting map.
    async fn import(&self, lang: &str, extracted: Extracted) -> Result<Translations, StoreError>;

    /// Create or update an editor account.
    async fn upsert_user(&self, login: &str, password: &str) -> Result<(), StoreError>;

    /// Check editor credentials.
    async fn authenticate(&self, login: &str, password: &str) -> Result<bool, StoreError>;
}
