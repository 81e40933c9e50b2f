//! Unix process host using signals, ps and a shell.
//!
//! Uses the following facilities:
//! - `kill(pid, 0)` to resolve a PID and to poll for its exit
//! - `kill(pid, SIGTERM)` / `kill(pid, SIGKILL)` for termination
//! - `ps -ww -p PID -o command=` for the untruncated command line
//! - `<shell> -c "<command> &"` for detached relaunch

use std::process::Stdio;
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DEFAULT_SHELL;
use crate::domain::{ProcessHandle, SignalKind};
use crate::error::{Error, Result};
use crate::ports::ProcessHostPort;

/// How often to probe a terminating process for exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Process host for Unix-like systems.
#[derive(Debug, Clone)]
pub struct UnixProcessHost {
    shell: String,
}

impl UnixProcessHost {
    /// Create a host that relaunches through `bash`.
    pub fn new() -> Self {
        Self::with_shell(DEFAULT_SHELL)
    }

    /// Create a host that relaunches through the given shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for UnixProcessHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a PID to a nix Pid, refusing values that address process groups.
fn to_nix_pid(pid: u32) -> Option<Pid> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Some(Pid::from_raw(raw)),
        _ => None,
    }
}

fn to_nix_signal(signal: SignalKind) -> Signal {
    match signal {
        SignalKind::Terminate => Signal::SIGTERM,
        SignalKind::Kill => Signal::SIGKILL,
    }
}

impl ProcessHostPort for UnixProcessHost {
    async fn query_command_line(&self, pid: u32) -> Result<String> {
        let output = Command::new("ps")
            .args(["-ww", "-p", &pid.to_string(), "-o", "command="])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::Inspection {
                pid,
                reason: format!("Failed to run ps: {}", e),
            })?;

        if !output.status.success() {
            return Err(Error::Inspection {
                pid,
                reason: format!("ps exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn resolve(&self, pid: u32) -> Result<ProcessHandle> {
        let nix_pid = to_nix_pid(pid).ok_or_else(|| Error::NotFound {
            pid,
            reason: "not a valid process id".to_string(),
        })?;

        match kill(nix_pid, None) {
            // EPERM: the process exists but belongs to someone else
            Ok(()) | Err(Errno::EPERM) => Ok(ProcessHandle::new(pid)),
            Err(e) => Err(Error::NotFound {
                pid,
                reason: e.desc().to_string(),
            }),
        }
    }

    fn signal(&self, handle: &ProcessHandle, signal: SignalKind) -> Result<()> {
        let pid = handle.pid();
        debug!(pid = pid, signal = %signal, "Sending signal to process");

        let nix_pid = to_nix_pid(pid).ok_or_else(|| Error::Signal {
            pid,
            signal,
            reason: "not a valid process id".to_string(),
        })?;

        kill(nix_pid, to_nix_signal(signal)).map_err(|e| Error::Signal {
            pid,
            signal,
            reason: e.desc().to_string(),
        })
    }

    async fn wait_for_exit(&self, handle: &ProcessHandle) {
        let Some(nix_pid) = to_nix_pid(handle.pid()) else {
            return;
        };

        loop {
            if let Err(Errno::ESRCH) = kill(nix_pid, None) {
                debug!(pid = handle.pid(), "Process has exited");
                return;
            }
            sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    async fn spawn_detached(&self, pid: u32, command_line: &str) -> Result<()> {
        debug!(pid = pid, shell = %self.shell, command = command_line, "Relaunching command");

        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(format!("{} &", command_line))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Relaunch {
                pid,
                command: command_line.to_string(),
                reason: e.to_string(),
            })?;

        // The shell backgrounds the command and exits at once; reap it off the caller's path
        tokio::spawn(async move {
            if let Err(e) = child.wait().await {
                warn!(error = %e, "Failed to reap relaunch shell");
            }
        });

        Ok(())
    }
}
