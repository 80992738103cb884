//! Request authentication.
//!
//! # Responsibilities
//! - Session tokens for editor logins (cookie-based, sliding expiry)
//! - Static API key allow-list for content and automation clients
//!
//! # Design Decisions
//! - Session tokens are opaque values compared against a known-valid set;
//!   no cryptography beyond that is in scope

pub mod api_key;
pub mod session;

pub use api_key::ApiKeys;
pub use session::SessionStore;
