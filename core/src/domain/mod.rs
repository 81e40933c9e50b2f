//! Domain layer - Pure data models.
//!
//! This module contains the entities the discovery and lifecycle logic works with.
//! These types have no I/O dependencies and can be tested in isolation.

mod process;
mod service;

// Re-export all domain types
pub use process::{ProcessHandle, RestartOutcome, SignalKind, StopOutcome};
pub use service::{in_ranges, PortRange, Service, DEFAULT_PORT_RANGES};
