//! Subcommand implementations.

pub mod config;
pub mod list;
pub mod restart;
pub mod stop;
