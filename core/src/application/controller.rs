//! Graceful stop and stop-then-relaunch of arbitrary processes.
//!
//! # Stop
//! 1. Refuse to act on our own PID
//! 2. Resolve the PID and send SIGTERM
//! 3. Wait for exit, bounded by the stop timeout
//! 4. On timeout, send SIGKILL (best-effort; its dispatch result is ignored)
//!
//! # Restart
//! The command line is captured before any signal is sent. Once the process is
//! gone it cannot be recovered, so inspection is the only failure point with no
//! side effects. A relaunch failure leaves the old process stopped.

use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::LifecycleTimings;
use crate::domain::{RestartOutcome, SignalKind, StopOutcome};
use crate::error::{Error, Result};
use crate::ports::ProcessHostPort;

use super::inspector::ProcessInspector;

/// Stops and restarts processes by PID.
pub struct ProcessController<H: ProcessHostPort> {
    host: Arc<H>,
    inspector: ProcessInspector<H>,
    timings: LifecycleTimings,
    own_pid: u32,
}

impl<H: ProcessHostPort> ProcessController<H> {
    pub fn new(host: Arc<H>, timings: LifecycleTimings) -> Self {
        Self {
            inspector: ProcessInspector::new(host.clone()),
            host,
            timings,
            own_pid: std::process::id(),
        }
    }

    pub fn timings(&self) -> LifecycleTimings {
        self.timings
    }

    fn ensure_not_self(&self, pid: u32) -> Result<()> {
        if pid == self.own_pid {
            warn!(pid = pid, "Refusing to operate on own process");
            return Err(Error::SelfOperation { pid });
        }
        Ok(())
    }

    /// Stop `pid`: SIGTERM, then SIGKILL if it is still running after the stop timeout.
    pub async fn stop(&self, pid: u32) -> Result<StopOutcome> {
        self.ensure_not_self(pid)?;

        let handle = self.host.resolve(pid)?;
        self.host.signal(&handle, SignalKind::Terminate)?;
        debug!(pid = pid, "SIGTERM sent, waiting for process to exit");

        // Dropping the wait future on timeout ends the watcher with this call
        match timeout(self.timings.stop_timeout, self.host.wait_for_exit(&handle)).await {
            Ok(()) => {
                info!(pid = pid, "Process exited after SIGTERM");
                Ok(StopOutcome::Exited)
            }
            Err(_) => {
                debug!(pid = pid, "Stop timeout elapsed, sending SIGKILL");
                if let Err(e) = self.host.signal(&handle, SignalKind::Kill) {
                    warn!(pid = pid, error = %e, "SIGKILL dispatch failed");
                }
                info!(pid = pid, "Process force-killed");
                Ok(StopOutcome::ForceKilled)
            }
        }
    }

    /// Capture the command line of `pid`, stop it, and relaunch the command detached.
    pub async fn restart(&self, pid: u32) -> Result<RestartOutcome> {
        self.ensure_not_self(pid)?;

        let command = self.inspector.command_line_of(pid).await?;
        debug!(pid = pid, command = %command, "Captured command line");

        let stop = self.stop(pid).await?;

        sleep(self.timings.port_release_delay).await;

        if let Err(e) = self.host.spawn_detached(pid, &command).await {
            warn!(pid = pid, command = %command, error = %e, "Relaunch failed; process stays stopped");
            return Err(e);
        }
        info!(pid = pid, command = %command, "Relaunched");

        sleep(self.timings.relaunch_settle).await;

        Ok(RestartOutcome { pid, command, stop })
    }
}
