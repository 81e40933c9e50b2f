//! Error types for the devport-core library.

use thiserror::Error;

use crate::domain::SignalKind;

/// Result type alias for devport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during service discovery and process lifecycle control.
///
/// Every variant is terminal for the operation that raised it; nothing is retried.
#[derive(Error, Debug)]
pub enum Error {
    /// The listening-socket enumeration could not be run or exited unsuccessfully.
    #[error("Service discovery failed: {0}")]
    Discovery(String),

    /// The command line of a process could not be read.
    #[error("Could not determine command line of process {pid}: {reason}")]
    Inspection { pid: u32, reason: String },

    /// No process with the given PID exists.
    #[error("Process {pid} not found: {reason}")]
    NotFound { pid: u32, reason: String },

    /// Dispatching a signal to the process failed.
    #[error("Failed to send {signal} to process {pid}: {reason}")]
    Signal {
        pid: u32,
        signal: SignalKind,
        reason: String,
    },

    /// The captured command line could not be relaunched.
    ///
    /// The original process has already been stopped when this is returned.
    #[error("Failed to relaunch process {pid} ({command}): {reason}")]
    Relaunch {
        pid: u32,
        command: String,
        reason: String,
    },

    /// The caller asked to stop or restart the controller's own process.
    #[error("Refusing to operate on own process {pid}")]
    SelfOperation { pid: u32 },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Payload-free classification of an [`Error`], for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DiscoveryFailure,
    InspectionFailure,
    NotFound,
    SignalFailure,
    RelaunchFailure,
    SelfOperationForbidden,
    Config,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Discovery(_) => ErrorKind::DiscoveryFailure,
            Error::Inspection { .. } => ErrorKind::InspectionFailure,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Signal { .. } => ErrorKind::SignalFailure,
            Error::Relaunch { .. } => ErrorKind::RelaunchFailure,
            Error::SelfOperation { .. } => ErrorKind::SelfOperationForbidden,
            Error::Config(_) | Error::Json(_) => ErrorKind::Config,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// True when the failure happened after the target process was already stopped.
    pub fn left_process_stopped(&self) -> bool {
        matches!(self, Error::Relaunch { .. })
    }
}
