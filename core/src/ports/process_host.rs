//! Process host port (interface).

use crate::domain::{ProcessHandle, SignalKind};
use crate::error::Result;

/// Port for inspecting, signalling and launching OS processes.
///
/// One implementation exists per target platform, plus a scripted double for tests.
pub trait ProcessHostPort: Send + Sync {
    /// Read the raw, untruncated command line of `pid`.
    ///
    /// Fails with [`Error::Inspection`](crate::Error::Inspection).
    fn query_command_line(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Resolve `pid` to a live process.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound).
    fn resolve(&self, pid: u32) -> Result<ProcessHandle>;

    /// Dispatch `signal` to the process.
    ///
    /// Fails with [`Error::Signal`](crate::Error::Signal).
    fn signal(&self, handle: &ProcessHandle, signal: SignalKind) -> Result<()>;

    /// Resolve once the process has exited.
    ///
    /// The returned future may never complete; callers bound it with a timeout
    /// and drop it when the timeout wins.
    fn wait_for_exit(
        &self,
        handle: &ProcessHandle,
    ) -> impl std::future::Future<Output = ()> + Send;

    /// Launch `command_line` through a shell, detached from the caller.
    ///
    /// Fails with [`Error::Relaunch`](crate::Error::Relaunch) (reported against `pid`,
    /// the process being replaced).
    fn spawn_detached(
        &self,
        pid: u32,
        command_line: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
