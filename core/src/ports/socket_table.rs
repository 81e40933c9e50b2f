//! Listening-socket enumeration port (interface).

use crate::error::Result;

/// Port for enumerating listening TCP sockets.
///
/// Implementations return the raw table produced by the OS tool, header line
/// included. Parsing is the application layer's job.
pub trait SocketTablePort: Send + Sync {
    /// List all listening TCP sockets system-wide, numeric, without name resolution.
    ///
    /// Any failure to produce the table is an [`Error::Discovery`](crate::Error::Discovery).
    fn enumerate_listeners(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}
