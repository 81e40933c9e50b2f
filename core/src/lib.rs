//! devport Core Library
//!
//! Discovery and lifecycle control for local development services.
//! Provides functionality to:
//! - List processes listening on development TCP ports (8000-9999 by default)
//! - Stop a process by PID (SIGTERM, then SIGKILL after a timeout)
//! - Restart a process by PID (capture command line, stop, relaunch detached)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions for OS capabilities
//! - `adapters`: OS implementations and a scripted test double
//! - `application`: Use case services
//!
//! # Platform Support
//! Unix-like systems. Uses `lsof`, `ps`, signals and a shell.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export domain types (primary API)
pub use domain::{PortRange, RestartOutcome, Service, SignalKind, StopOutcome};

// Re-export other commonly used types
pub use application::{PortScanner, ProcessController, ProcessInspector, ServiceManager};
#[cfg(unix)]
pub use application::SystemServiceManager;
pub use config::{Config, ConfigStore, LifecycleTimings};
pub use error::{Error, ErrorKind, Result};
