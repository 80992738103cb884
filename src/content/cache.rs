//! TTL cache for CMS content.
//!
//! # Design Decisions
//! - Staleness only, no size-based eviction: the key space is a handful of
//!   content queries
//! - Staleness is checked lazily on read; stale entries are evicted there
//!   and the caller repopulates via `set_item`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::observability::metrics;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    updated_at: u64,
}

/// Concurrent key/value cache with per-read staleness cutoff.
#[derive(Default)]
pub struct ContentCache {
    inner: DashMap<String, CacheEntry>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if it was written within `stale_time`,
    /// evicting it otherwise.
    pub fn get_item(&self, key: &str, stale_time: Duration) -> Option<String> {
        self.get_item_at(key, stale_time, now_ms())
    }

    pub(crate) fn get_item_at(
        &self,
        key: &str,
        stale_time: Duration,
        now: u64,
    ) -> Option<String> {
        // The read guard must be dropped before the eviction below.
        let stale = match self.inner.get(key) {
            Some(entry) if entry.updated_at + stale_time.as_millis() as u64 > now => {
                metrics::record_cache_lookup(true);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if stale {
            self.inner.remove(key);
        }
        metrics::record_cache_lookup(false);
        None
    }

    /// Insert or refresh a value with the current timestamp.
    pub fn set_item(&self, key: &str, value: String) {
        self.set_item_at(key, value, now_ms());
    }

    pub(crate) fn set_item_at(&self, key: &str, value: String, now: u64) {
        self.inner.insert(
            key.to_string(),
            CacheEntry {
                value,
                updated_at: now,
            },
        );
    }

    pub fn remove_item(&self, key: &str) {
        self.inner.remove(key);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
