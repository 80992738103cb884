//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request path
//!     → segments.rs (split into path segments)
//!     → score.rs (score every registered pattern, extract params)
//!     → table.rs (pick the best-scoring handler)
//!     → Return: (handler, params) or no match
//!
//! Route Registration (at startup):
//!     (pattern, handler) pairs
//!     → RouteTable::register in declaration order
//!     → Freeze behind Arc, read-only thereafter
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime (lock-free lookup)
//! - Linear scan over all entries instead of a trie: tables here are a few
//!   dozen entries of at most ~5 segments each, so constant overhead
//!   dominates asymptotics
//! - Score is a percentage of pattern coverage; only an all-literal full
//!   match reaches 100, so exact routes always outrank parametrized ones
//! - First-registered route wins score ties

pub mod score;
pub mod segments;
pub mod table;

pub use score::{score, Params};
pub use segments::segments;
pub use table::RouteTable;
