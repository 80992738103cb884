//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Editor session settings.
    pub session: SessionConfig,

    /// Translation lock settings.
    pub locks: LockConfig,

    /// Content cache settings.
    pub cache: CacheConfig,

    /// CMS collaborator settings.
    pub content: ContentConfig,

    /// API key allow-list.
    pub keys: KeysConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Editor session settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of server-generated secrets in the token pool.
    pub pool_size: usize,

    /// Idle lifetime of a session; renewed on every valid request.
    pub cookie_age_secs: u64,

    /// Mark session cookies `Secure` (disable for local development).
    pub secure_cookies: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            cookie_age_secs: 3600,
            secure_cookies: true,
        }
    }
}

impl SessionConfig {
    pub fn cookie_age(&self) -> Duration {
        Duration::from_secs(self.cookie_age_secs)
    }
}

/// Translation lock settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockConfig {
    /// Lifetime of a lock claim; renewed by repeat lock messages.
    pub ttl_secs: u64,

    /// Interval of the background sweep that evicts expired locks.
    pub sweep_interval_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 600,
            sweep_interval_secs: 600,
        }
    }
}

impl LockConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Content cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Hard staleness cutoff for cached CMS content.
    pub stale_time_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: 3600,
        }
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

/// CMS collaborator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Base URL of the CMS content API.
    pub base_url: String,

    /// Timeout for CMS requests in seconds.
    pub timeout_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3333".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ContentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// API key allow-list. Empty keys never match.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KeysConfig {
    /// Key issued to the web client.
    pub web_client_key: String,

    /// Key issued to the mobile client.
    pub mobile_client_key: String,

    /// Key used by the CI pipeline for imports and user management.
    pub automation_key: String,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address the scrape endpoint listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = AppConfig::default();
        assert_eq!(config.session.pool_size, 10);
        assert_eq!(config.locks.ttl_secs, 600);
        assert_eq!(config.locks.sweep_interval_secs, 600);
        assert_eq!(config.cache.stale_time_secs, 3600);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:8080"

            [keys]
            automation_key = "ci-key"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert_eq!(config.keys.automation_key, "ci-key");
        assert!(config.keys.web_client_key.is_empty());
    }
}
