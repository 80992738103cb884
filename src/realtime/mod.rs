//! Real-time lock coordination over WebSocket.
//!
//! # Data Flow
//! ```text
//! WebSocket upgrade (session-gated, tagged with an owner id)
//!     → socket.rs (per-connection task)
//!     → protocol.rs (parse client messages)
//!     → locks.rs (lock / release / release-all transitions)
//!     → hub.rs (fan state changes out to every connected editor)
//!
//! Background:
//!     sweep task → locks.rs (evict expired) → hub.rs (release events)
//! ```
//!
//! # Design Decisions
//! - Locks are advisory UX aids, in-memory only, lost on restart; the
//!   translation data itself lives in persistent storage
//! - Fan-out is fire-and-forget: a dead or slow connection never blocks the
//!   others, and there is no replay — late joiners get an `init` snapshot
//! - Disconnect releases the connection's locks immediately; the TTL sweep
//!   is the backstop for clients that never came back

pub mod hub;
pub mod locks;
pub mod protocol;
pub mod socket;

pub use hub::BroadcastHub;
pub use locks::LockTable;
pub use protocol::{ClientMessage, ServerMessage};
