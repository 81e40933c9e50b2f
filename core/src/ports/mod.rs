//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the OS capabilities that the application layer uses.
//! Implementations live in `adapters`.

mod process_host;
mod socket_table;

pub use process_host::ProcessHostPort;
pub use socket_table::SocketTablePort;
