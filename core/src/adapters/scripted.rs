//! Scripted, in-memory host for deterministic tests.
//!
//! `ScriptedHost` implements both [`SocketTablePort`] and [`ProcessHostPort`]
//! without touching the OS. Tests inject the enumeration text, simulate how long
//! each process takes to exit, inject failures, and inspect the ordered log of
//! every capability call.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::{ProcessHandle, SignalKind};
use crate::error::{Error, Result};
use crate::ports::{ProcessHostPort, SocketTablePort};

/// One recorded capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    EnumerateListeners,
    QueryCommandLine(u32),
    Resolve(u32),
    Signal(u32, SignalKind),
    WaitForExit(u32),
    SpawnDetached(String),
}

/// How a scripted process reacts once it is asked to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitBehavior {
    /// Exit this long after the wait begins.
    After(Duration),
    /// Ignore SIGTERM; only SIGKILL removes it.
    Never,
}

#[derive(Debug, Clone)]
struct ScriptedProcess {
    command_line: Option<String>,
    exit: ExitBehavior,
    refuse_signals: bool,
}

/// In-memory process table and socket table.
#[derive(Debug)]
pub struct ScriptedHost {
    socket_table: Mutex<std::result::Result<String, String>>,
    processes: Mutex<HashMap<u32, ScriptedProcess>>,
    spawn_failure: Mutex<Option<String>>,
    fail_force_kill: Mutex<bool>,
    calls: Mutex<Vec<HostCall>>,
}

impl ScriptedHost {
    /// An empty host: header-only socket table, no processes.
    pub fn new() -> Self {
        Self {
            socket_table: Mutex::new(Ok(
                "COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME\n".to_string(),
            )),
            processes: Mutex::new(HashMap::new()),
            spawn_failure: Mutex::new(None),
            fail_force_kill: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Serve `table` as the raw enumeration output.
    pub fn with_socket_table(self, table: impl Into<String>) -> Self {
        *self.socket_table.lock() = Ok(table.into());
        self
    }

    /// Make enumeration fail with `reason`.
    pub fn with_failing_socket_table(self, reason: impl Into<String>) -> Self {
        *self.socket_table.lock() = Err(reason.into());
        self
    }

    /// Add a process that exits as soon as it is waited on.
    pub fn with_process(self, pid: u32, command_line: impl Into<String>) -> Self {
        self.insert(pid, Some(command_line.into()), ExitBehavior::After(Duration::ZERO))
    }

    /// Add a process with explicit exit behaviour.
    pub fn with_exit_behavior(
        self,
        pid: u32,
        command_line: impl Into<String>,
        exit: ExitBehavior,
    ) -> Self {
        self.insert(pid, Some(command_line.into()), exit)
    }

    /// Add a process whose command line cannot be read.
    pub fn with_hidden_process(self, pid: u32) -> Self {
        self.insert(pid, None, ExitBehavior::After(Duration::ZERO))
    }

    /// Make every signal dispatch to `pid` fail.
    pub fn refusing_signals(self, pid: u32) -> Self {
        if let Some(process) = self.processes.lock().get_mut(&pid) {
            process.refuse_signals = true;
        }
        self
    }

    /// Make SIGKILL dispatch fail for every process.
    pub fn failing_force_kill(self) -> Self {
        *self.fail_force_kill.lock() = true;
        self
    }

    /// Make detached spawns fail with `reason`.
    pub fn with_failing_spawn(self, reason: impl Into<String>) -> Self {
        *self.spawn_failure.lock() = Some(reason.into());
        self
    }

    fn insert(self, pid: u32, command_line: Option<String>, exit: ExitBehavior) -> Self {
        self.processes.lock().insert(
            pid,
            ScriptedProcess {
                command_line,
                exit,
                refuse_signals: false,
            },
        );
        self
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    /// Signal dispatches attempted so far, in order.
    pub fn signals(&self) -> Vec<(u32, SignalKind)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Signal(pid, kind) => Some((*pid, *kind)),
                _ => None,
            })
            .collect()
    }

    /// Command lines passed to `spawn_detached`, in order.
    pub fn spawned(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::SpawnDetached(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Check whether `pid` is still in the process table.
    pub fn is_alive(&self, pid: u32) -> bool {
        self.processes.lock().contains_key(&pid)
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SocketTablePort for ScriptedHost {
    async fn enumerate_listeners(&self) -> Result<String> {
        self.record(HostCall::EnumerateListeners);
        self.socket_table.lock().clone().map_err(Error::Discovery)
    }
}

impl ProcessHostPort for ScriptedHost {
    async fn query_command_line(&self, pid: u32) -> Result<String> {
        self.record(HostCall::QueryCommandLine(pid));

        let command_line = self
            .processes
            .lock()
            .get(&pid)
            .map(|process| process.command_line.clone());

        match command_line {
            Some(Some(command)) => Ok(command),
            Some(None) => Err(Error::Inspection {
                pid,
                reason: "ps exited with exit status: 1".to_string(),
            }),
            None => Err(Error::Inspection {
                pid,
                reason: "no such process".to_string(),
            }),
        }
    }

    fn resolve(&self, pid: u32) -> Result<ProcessHandle> {
        self.record(HostCall::Resolve(pid));

        if self.processes.lock().contains_key(&pid) {
            Ok(ProcessHandle::new(pid))
        } else {
            Err(Error::NotFound {
                pid,
                reason: "No such process".to_string(),
            })
        }
    }

    fn signal(&self, handle: &ProcessHandle, signal: SignalKind) -> Result<()> {
        let pid = handle.pid();
        self.record(HostCall::Signal(pid, signal));

        let mut processes = self.processes.lock();
        let refused = processes
            .get(&pid)
            .map(|process| process.refuse_signals)
            .unwrap_or(false);

        if refused || (signal == SignalKind::Kill && *self.fail_force_kill.lock()) {
            return Err(Error::Signal {
                pid,
                signal,
                reason: "Operation not permitted".to_string(),
            });
        }

        if signal == SignalKind::Kill {
            processes.remove(&pid);
        }
        Ok(())
    }

    async fn wait_for_exit(&self, handle: &ProcessHandle) {
        let pid = handle.pid();
        self.record(HostCall::WaitForExit(pid));

        let exit = self.processes.lock().get(&pid).map(|process| process.exit);

        match exit {
            Some(ExitBehavior::After(delay)) => {
                tokio::time::sleep(delay).await;
                self.processes.lock().remove(&pid);
            }
            Some(ExitBehavior::Never) => std::future::pending::<()>().await,
            None => {}
        }
    }

    async fn spawn_detached(&self, pid: u32, command_line: &str) -> Result<()> {
        self.record(HostCall::SpawnDetached(command_line.to_string()));

        let failure = self.spawn_failure.lock().clone();
        match failure {
            Some(reason) => Err(Error::Relaunch {
                pid,
                command: command_line.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}
