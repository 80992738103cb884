//! Observability: structured logging and metrics.
//!
//! # Design Decisions
//! - `tracing` for structured logs, initialized once in `main` with an
//!   `EnvFilter` so verbosity is controlled by `RUST_LOG`
//! - `metrics` facade with a Prometheus exporter; recording is cheap enough
//!   to call from lock/cache hot paths

pub mod metrics;
