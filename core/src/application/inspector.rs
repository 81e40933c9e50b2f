//! Command-line capture for running processes.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::ports::ProcessHostPort;

/// Resolves the full launch command line of a process.
pub struct ProcessInspector<H: ProcessHostPort> {
    host: Arc<H>,
}

impl<H: ProcessHostPort> ProcessInspector<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// Capture the command line of `pid`, trimmed.
    ///
    /// An empty result means the process is gone or not visible to us.
    pub async fn command_line_of(&self, pid: u32) -> Result<String> {
        let raw = self.host.query_command_line(pid).await?;
        let command = raw.trim();

        if command.is_empty() {
            return Err(Error::Inspection {
                pid,
                reason: "empty command line".to_string(),
            });
        }

        Ok(command.to_string())
    }
}
