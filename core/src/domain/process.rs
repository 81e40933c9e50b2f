//! Process handle, signal and lifecycle outcome models.

use serde::Serialize;

/// Reference to a running process, valid for the duration of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle {
    pid: u32,
}

impl ProcessHandle {
    /// Wrap a PID that has been resolved to a live process.
    pub fn new(pid: u32) -> Self {
        Self { pid }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }
}

/// Signals the controller can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalKind {
    /// Graceful termination request (SIGTERM).
    Terminate,
    /// Unconditional termination (SIGKILL).
    Kill,
}

impl SignalKind {
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::Terminate => "SIGTERM",
            SignalKind::Kill => "SIGKILL",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How a stop completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopOutcome {
    /// The process exited within the grace period after SIGTERM.
    Exited,
    /// The grace period elapsed and SIGKILL was dispatched (best-effort).
    ForceKilled,
}

/// Acknowledgement of a completed restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestartOutcome {
    /// PID of the process that was stopped.
    pub pid: u32,
    /// Command line that was relaunched.
    pub command: String,
    /// How the old process was stopped.
    pub stop: StopOutcome,
}
