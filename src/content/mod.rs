//! CMS content collaborator.
//!
//! # Data Flow
//! ```text
//! Content route handler
//!     → cache.rs (fresh value? serve it)
//!     → ContentSource::fetch (on miss)
//!     → cache.rs set_item (repopulate)
//!     → JSON response with cache headers
//! ```
//!
//! The CMS itself (query language, schema) is out of scope; the core only
//! depends on the narrow [`ContentSource`] interface.

pub mod cache;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use cache::ContentCache;

/// How many previously picked cards a random-card request may exclude.
const MAX_EXCLUDED_CARDS: usize = 90;

/// One content lookup against the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentQuery {
    CardsSet {
        language: String,
    },
    CardById {
        language: String,
        id: String,
    },
    RandomCard {
        language: String,
        exclude: Vec<String>,
    },
    Pages {
        language: String,
    },
}

impl ContentQuery {
    /// Cap the exclusion list of a random-card query to the most recent
    /// picks; older ones may repeat.
    pub fn random_card(language: String, mut exclude: Vec<String>) -> Self {
        if exclude.len() > MAX_EXCLUDED_CARDS {
            exclude.drain(..exclude.len() - MAX_EXCLUDED_CARDS);
        }
        ContentQuery::RandomCard { language, exclude }
    }

    /// Stable cache key. Random-card queries are never cached and have none.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            ContentQuery::CardsSet { language } => Some(format!("cards-set:{language}")),
            ContentQuery::CardById { language, id } => Some(format!("card:{language}:{id}")),
            ContentQuery::RandomCard { .. } => None,
            ContentQuery::Pages { language } => Some(format!("pages:{language}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content request failed: {0}")]
    Request(String),

    #[error("content not found")]
    NotFound,
}

/// Narrow fetch interface to the CMS.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value, ContentError>;
}

/// HTTP implementation of [`ContentSource`] against the CMS API.
pub struct CmsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CmsClient {
    pub fn new(base_url: Url, timeout: std::time::Duration) -> Result<Self, ContentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentError::Request(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, query: &ContentQuery) -> Result<Url, ContentError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ContentError::Request("CMS base URL cannot be a base".into()))?;
            match query {
                ContentQuery::CardsSet { language } => {
                    path.extend(["cards-set", language]);
                }
                ContentQuery::CardById { language, id } => {
                    path.extend(["card", language, id]);
                }
                ContentQuery::RandomCard { language, .. } => {
                    path.extend(["random-card", language]);
                }
                ContentQuery::Pages { language } => {
                    path.extend(["pages", language]);
                }
            }
        }
        if let ContentQuery::RandomCard { exclude, .. } = query {
            if !exclude.is_empty() {
                url.query_pairs_mut().append_pair("exclude", &exclude.join(","));
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch(&self, query: &ContentQuery) -> Result<Value, ContentError> {
        let url = self.endpoint(query)?;
        tracing::debug!(url = %url, "fetching content");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound);
        }
        if !response.status().is_success() {
            return Err(ContentError::Request(format!(
                "CMS responded with {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| ContentError::Request(e.to_string()))
    }
}
