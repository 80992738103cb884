//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. Pure function, returns
//! every violation instead of stopping at the first.

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a configuration. Returns all violations.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            "must be a socket address like 0.0.0.0:3000",
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(err("listener.request_timeout_secs", "must be > 0"));
    }

    if config.session.pool_size == 0 {
        errors.push(err("session.pool_size", "must be > 0"));
    }
    if config.session.cookie_age_secs == 0 {
        errors.push(err("session.cookie_age_secs", "must be > 0"));
    }

    if config.locks.ttl_secs == 0 {
        errors.push(err("locks.ttl_secs", "must be > 0"));
    }
    if config.locks.sweep_interval_secs == 0 {
        errors.push(err("locks.sweep_interval_secs", "must be > 0"));
    }

    if config.cache.stale_time_secs == 0 {
        errors.push(err("cache.stale_time_secs", "must be > 0"));
    }

    match Url::parse(&config.content.base_url) {
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(err("content.base_url", "must be a base URL"));
        }
        Ok(_) => {}
        Err(e) => errors.push(err("content.base_url", e.to_string())),
    }
    if config.content.timeout_secs == 0 {
        errors.push(err("content.timeout_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(err(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
