//! Listening-socket enumeration using lsof.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ports::SocketTablePort;

/// Socket table source backed by `lsof`.
#[derive(Debug, Clone)]
pub struct LsofSocketTable {
    program: String,
}

impl LsofSocketTable {
    /// Create a source that runs `lsof` from `PATH`.
    pub fn new() -> Self {
        Self::with_program("lsof")
    }

    /// Create a source that runs the given lsof binary.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for LsofSocketTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketTablePort for LsofSocketTable {
    /// Enumerate listening sockets.
    ///
    /// Executes: `lsof -iTCP -sTCP:LISTEN -nP`
    ///
    /// Flags explained:
    /// - -iTCP: Show only TCP sockets
    /// - -sTCP:LISTEN: Show only listening sockets
    /// - -n: Show IP addresses (don't resolve to hostnames)
    /// - -P: Show port numbers (don't resolve to service names)
    async fn enumerate_listeners(&self) -> Result<String> {
        debug!(program = %self.program, "Enumerating listening sockets");

        let output = Command::new(&self.program)
            .args(["-iTCP", "-sTCP:LISTEN", "-nP"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Discovery(format!("Failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Discovery(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
