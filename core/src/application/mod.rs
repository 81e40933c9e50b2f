//! Application layer - Use case services.
//!
//! This module contains application services that orchestrate
//! domain logic and adapter interactions.
//!
//! Services are designed to be thin orchestrators that:
//! - Accept domain types as inputs
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs

mod controller;
mod inspector;
mod scanner;
mod service_manager;

pub use controller::ProcessController;
pub use inspector::ProcessInspector;
pub use scanner::{ListenerTableParser, PortScanner};
pub use service_manager::ServiceManager;
#[cfg(unix)]
pub use service_manager::SystemServiceManager;
