//! Route lookup.
//!
//! # Responsibilities
//! - Store registered (pattern, handler) pairs in declaration order
//! - Look up the best-scoring handler for an incoming path
//! - Return an explicit no-match instead of a silent default
//!
//! # Design Decisions
//! - Immutable after registration: shared behind `Arc`, concurrent lookups
//!   need no locking
//! - Full linear scan with a short-circuit on a perfect (100) score
//! - Strictly-greater score replaces the current best, so the earliest
//!   registered entry wins ties

use super::score::{score, Params};
use super::segments;

/// Ordered table of route patterns, generic over the handler type so the
/// matching logic stays free of HTTP concerns.
pub struct RouteTable<H> {
    entries: Vec<(String, H)>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a route. Registration order is the tie-break order.
    pub fn register(&mut self, pattern: impl Into<String>, handler: H) {
        self.entries.push((pattern.into(), handler));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the best-matching handler for a path.
    ///
    /// Scans every entry, short-circuits on a perfect score, otherwise keeps
    /// the highest-scoring entry seen. A best score of 0 is no match.
    pub fn lookup(&self, path: &str) -> Option<(&H, Params)> {
        let url_segments = segments(path);
        let mut best_score = 0.0_f64;
        let mut best: Option<(usize, Params)> = None;

        for (i, (pattern, handler)) in self.entries.iter().enumerate() {
            let (entry_score, params) = score(&url_segments, pattern);
            if entry_score >= 100.0 {
                return Some((handler, params));
            }
            if entry_score > best_score {
                best_score = entry_score;
                best = Some((i, params));
            }
        }

        best.map(|(i, params)| (&self.entries[i].1, params))
    }
}
