//! Tarot content API and real-time translation editor server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    SERVER                        │
//!   HTTP Request     │  ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│ routing  │──▶│   handlers   │  │
//!                    │  │ server  │   │  table   │   │content/trans.│  │
//!                    │  └─────────┘   └──────────┘   └──────┬───────┘  │
//!                    │                                      │          │
//!                    │              ┌───────────┐     ┌─────▼──────┐   │
//!   WS upgrade       │              │ realtime  │◀────│  security  │   │
//!   ─────────────────┼─────────────▶│locks + hub│     │session/key │   │
//!                    │              └───────────┘     └────────────┘   │
//!                    │                                                 │
//!                    │  collaborators: content (CMS + cache),          │
//!                    │                 translations (store)            │
//!                    │  cross-cutting: config, observability,          │
//!                    │                 lifecycle                       │
//!                    └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod realtime;
pub mod routing;
pub mod security;

// Collaborators
pub mod content;
pub mod translations;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
