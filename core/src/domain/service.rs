//! Service and port range domain models.

use serde::{Deserialize, Serialize};

// ============================================================================
// PortRange
// ============================================================================

/// An inclusive range of TCP ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

/// Ports conventionally used by development services.
pub const DEFAULT_PORT_RANGES: [PortRange; 2] = [
    PortRange::new(8000, 8999),
    PortRange::new(9000, 9999),
];

impl PortRange {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Check whether `port` lies within this range.
    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }

    /// A range is valid when it is not inverted.
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

impl std::fmt::Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Check whether `port` lies in any of `ranges`.
pub fn in_ranges(ranges: &[PortRange], port: u16) -> bool {
    ranges.iter().any(|r| r.contains(port))
}

// ============================================================================
// Service
// ============================================================================

/// A listening endpoint discovered in one scan.
///
/// Services are snapshots: rebuilt on every discovery and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Service {
    /// Owning process name as reported by the enumeration tool (may be truncated).
    pub name: String,

    /// Process ID as reported. Kept textual; see [`Service::pid_number`].
    pub pid: String,

    /// Listening TCP port.
    pub port: u16,

    /// Bind address, e.g. "127.0.0.1:8080", "[::1]:9000" or "*:8080".
    pub address: String,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        pid: impl Into<String>,
        port: u16,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pid: pid.into(),
            port,
            address: address.into(),
        }
    }

    /// Numeric PID, if the reported value is numeric.
    pub fn pid_number(&self) -> Option<u32> {
        self.pid.parse().ok()
    }

    /// Check if the process name contains `query` (case-insensitive).
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}
