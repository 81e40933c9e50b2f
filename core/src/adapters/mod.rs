//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

#[cfg(unix)]
mod lsof;
mod scripted;
#[cfg(unix)]
mod unix;

#[cfg(not(unix))]
compile_error!("Unsupported platform: only Unix-like systems are supported");

// Re-export main types for convenience
#[cfg(unix)]
pub use lsof::LsofSocketTable;
pub use scripted::{ExitBehavior, HostCall, ScriptedHost};
#[cfg(unix)]
pub use unix::UnixProcessHost;
