//! Advisory lock table for translation keys.
//!
//! # Responsibilities
//! - Track which editor currently owns which translation key
//! - Enforce at most one live lock per key
//! - Evict expired locks on a periodic sweep
//!
//! # Design Decisions
//! - One mutex guards the whole map; every operation is atomic with respect
//!   to the others and never awaits while holding the guard
//! - TTL is fixed per table, not per call: every successful lock sets the
//!   same horizon from now
//! - Ownership is never transferred implicitly; a second owner's lock call
//!   on a live key fails and leaves the record unchanged

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::observability::metrics;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[derive(Debug, Clone)]
struct LockRecord {
    owner: String,
    expires_at: u64,
}

/// In-memory map of translation key → (owner, expiry).
pub struct LockTable {
    inner: Mutex<HashMap<String, LockRecord>>,
    ttl: Duration,
}

impl LockTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Claim or renew a lock. Returns false when another owner holds a live
    /// lock on the key.
    pub fn lock(&self, key: &str, owner: &str) -> bool {
        self.lock_at(key, owner, now_ms())
    }

    pub(crate) fn lock_at(&self, key: &str, owner: &str, now: u64) -> bool {
        let mut locks = self.inner.lock().expect("lock table mutex poisoned");
        let expires_at = now + self.ttl.as_millis() as u64;
        match locks.get_mut(key) {
            // Renewal: same owner keeps the lock alive with a fresh horizon.
            Some(record) if record.owner == owner => {
                record.expires_at = expires_at;
                true
            }
            // An expired record is free for the taking.
            Some(record) if record.expires_at <= now => {
                record.owner = owner.to_string();
                record.expires_at = expires_at;
                true
            }
            Some(_) => false,
            None => {
                locks.insert(
                    key.to_string(),
                    LockRecord {
                        owner: owner.to_string(),
                        expires_at,
                    },
                );
                metrics::record_locks_held(locks.len());
                true
            }
        }
    }

    /// Release a lock. Releasing an already-free key succeeds as a no-op;
    /// releasing someone else's lock fails.
    pub fn release(&self, key: &str, owner: &str) -> bool {
        let mut locks = self.inner.lock().expect("lock table mutex poisoned");
        match locks.get(key) {
            Some(record) if record.owner == owner => {
                locks.remove(key);
                metrics::record_locks_held(locks.len());
                true
            }
            Some(_) => false,
            None => true,
        }
    }

    /// Release every key held by `owner`, returning the released keys.
    /// Used when an editor disconnects or signs off all edits.
    pub fn release_by_id(&self, owner: &str) -> Vec<String> {
        let mut locks = self.inner.lock().expect("lock table mutex poisoned");
        let released: Vec<String> = locks
            .iter()
            .filter(|(_, record)| record.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &released {
            locks.remove(key);
        }
        metrics::record_locks_held(locks.len());
        released
    }

    /// Evict every expired record, returning the expired keys. Each key is
    /// reported exactly once; later sweeps see it as already gone.
    pub fn sweep(&self) -> Vec<String> {
        self.sweep_at(now_ms())
    }

    pub(crate) fn sweep_at(&self, now: u64) -> Vec<String> {
        let mut locks = self.inner.lock().expect("lock table mutex poisoned");
        let expired: Vec<String> = locks
            .iter()
            .filter(|(_, record)| record.expires_at <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            locks.remove(key);
        }
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "swept expired locks");
            metrics::record_locks_held(locks.len());
        }
        expired
    }

    /// Snapshot of key → owner, sent as the `init` message to new
    /// connections.
    pub fn owners(&self) -> HashMap<String, String> {
        let locks = self.inner.lock().expect("lock table mutex poisoned");
        locks
            .iter()
            .map(|(key, record)| (key.clone(), record.owner.clone()))
            .collect()
    }

    /// Drop lock records whose key is no longer a known translation key
    /// (after an import replaced the key set) and return the surviving
    /// owners snapshot.
    pub fn retain(&self, valid_keys: &HashSet<String>) -> HashMap<String, String> {
        let mut locks = self.inner.lock().expect("lock table mutex poisoned");
        locks.retain(|key, _| valid_keys.contains(key));
        metrics::record_locks_held(locks.len());
        locks
            .iter()
            .map(|(key, record)| (key.clone(), record.owner.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    fn table() -> LockTable {
        LockTable::new(TTL)
    }

    #[test]
    fn test_lock_free_key() {
        let t = table();
        assert!(t.lock("card.title", "alice"));
        assert_eq!(t.owners().get("card.title").unwrap(), "alice");
    }

    #[test]
    fn test_second_owner_denied() {
        let t = table();
        assert!(t.lock_at("card.title", "alice", 0));
        assert!(!t.lock_at("card.title", "bob", 1));
        // Owner unchanged.
        assert_eq!(t.owners().get("card.title").unwrap(), "alice");
    }

    #[test]
    fn test_same_owner_renews() {
        let t = table();
        assert!(t.lock_at("k", "alice", 0));
        assert!(t.lock_at("k", "alice", 1000));
        // Renewal extended the horizon past the original expiry.
        assert!(t.sweep_at(TTL.as_millis() as u64 + 500).is_empty());
        assert_eq!(t.owners().get("k").unwrap(), "alice");
    }

    #[test]
    fn test_expired_lock_is_claimable() {
        let t = table();
        assert!(t.lock_at("k", "alice", 0));
        let after_expiry = TTL.as_millis() as u64;
        assert!(t.lock_at("k", "bob", after_expiry));
        assert_eq!(t.owners().get("k").unwrap(), "bob");
    }

    #[test]
    fn test_release_by_owner() {
        let t = table();
        assert!(t.lock("k", "alice"));
        assert!(t.release("k", "alice"));
        assert!(t.lock("k", "bob"));
    }

    #[test]
    fn test_release_by_other_denied() {
        let t = table();
        assert!(t.lock("k", "alice"));
        assert!(!t.release("k", "bob"));
        assert_eq!(t.owners().get("k").unwrap(), "alice");
    }

    #[test]
    fn test_release_free_key_is_noop() {
        let t = table();
        assert!(t.release("never-locked", "anyone"));
    }

    #[test]
    fn test_release_by_id_releases_only_that_owner() {
        let t = table();
        t.lock("a", "alice");
        t.lock("b", "alice");
        t.lock("c", "bob");
        let mut released = t.release_by_id("alice");
        released.sort();
        assert_eq!(released, vec!["a", "b"]);
        let owners = t.owners();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners.get("c").unwrap(), "bob");
    }

    #[test]
    fn test_sweep_reports_each_key_once() {
        let t = table();
        t.lock_at("k", "alice", 0);
        let at = TTL.as_millis() as u64;
        assert_eq!(t.sweep_at(at), vec!["k"]);
        assert!(t.sweep_at(at + 1).is_empty());
        assert!(t.owners().is_empty());
    }

    #[test]
    fn test_sweep_spares_live_locks() {
        let t = table();
        t.lock_at("old", "alice", 0);
        t.lock_at("fresh", "bob", 1000);
        assert_eq!(t.sweep_at(TTL.as_millis() as u64), vec!["old"]);
        assert_eq!(t.owners().get("fresh").unwrap(), "bob");
    }

    #[test]
    fn test_retain_drops_unknown_keys() {
        let t = table();
        t.lock("kept", "alice");
        t.lock("removed", "bob");
        let valid: HashSet<String> = ["kept".to_string()].into_iter().collect();
        let owners = t.retain(&valid);
        assert_eq!(owners.len(), 1);
        assert_eq!(owners.get("kept").unwrap(), "alice");
    }

    #[test]
    fn test_lock_then_release_interleaving_is_atomic() {
        use std::sync::Arc;
        let t = Arc::new(table());
        let mut handles = Vec::new();
        for i in 0..8 {
            let t = t.clone();
            handles.push(std::thread::spawn(move || {
                let owner = format!("owner-{i}");
                for _ in 0..100 {
                    if t.lock("contested", &owner) {
                        assert!(t.release("contested", &owner));
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // Every claim was paired with a release; the key ends free.
        assert!(t.owners().is_empty());
    }
}
