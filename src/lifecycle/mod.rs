//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Initialize subsystems → Spawn sweeps → Serve
//!
//! Shutdown:
//!     ctrl-c → Shutdown broadcast → sweeps exit, server drains → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
