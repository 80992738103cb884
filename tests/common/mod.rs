//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use tarot_api::config::AppConfig;
use tarot_api::content::{ContentError, ContentQuery, ContentSource};
use tarot_api::translations::MemoryStore;
use tarot_api::HttpServer;

pub const WEB_KEY: &str = "web-key";
pub const AUTOMATION_KEY: &str = "ci-key";

/// Content source that serves canned data and counts fetches.
pub struct StubContent {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl StubContent {
    pub fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for StubContent {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value, ContentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ContentError::Request("cms unreachable".into()));
        }
        Ok(json!({ "query": format!("{query:?}") }))
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.keys.web_client_key = WEB_KEY.into();
    config.keys.mobile_client_key = "mobile-key".into();
    config.keys.automation_key = AUTOMATION_KEY.into();
    config.session.secure_cookies = false;
    config
}

#[allow(dead_code)]
pub fn test_server(fail_content: bool) -> (HttpServer, Arc<StubContent>, Arc<MemoryStore>) {
    let content = Arc::new(StubContent::new(fail_content));
    let translations = Arc::new(MemoryStore::new());
    let server = HttpServer::new(test_config(), content.clone(), translations.clone());
    (server, content, translations)
}
