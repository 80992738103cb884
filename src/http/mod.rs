//! HTTP surface: server, dispatcher and route handlers.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → server.rs (axum catch-all, middleware)
//!     → dispatch.rs (route table lookup, auth policy)
//!     → content.rs / translations.rs (handler bodies)
//!     → Response (or WebSocket upgrade handed to realtime::socket)
//! ```

pub mod client_errors;
pub mod content;
pub mod dispatch;
pub mod response;
pub mod routes;
pub mod server;
pub mod translations;

pub use server::{AppState, HttpServer};
