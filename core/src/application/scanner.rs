//! Service discovery from the listening-socket table.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::domain::{in_ranges, PortRange, Service, DEFAULT_PORT_RANGES};
use crate::error::Result;
use crate::ports::SocketTablePort;

/// Parser for `lsof -iTCP -sTCP:LISTEN -nP` tables.
///
/// Expected format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:8080 (LISTEN)
/// ```
///
/// Malformed lines are skipped, never reported as errors: the column layout
/// differs slightly between lsof versions.
#[derive(Debug, Clone)]
pub struct ListenerTableParser {
    port_re: Regex,
    address_re: Regex,
}

impl ListenerTableParser {
    pub fn new() -> Self {
        Self {
            port_re: Regex::new(r":(\d+)\s+\(LISTEN\)").expect("valid port pattern"),
            address_re: Regex::new(r"\s([\w.*%:\[\]]+:\d+)\s+\(LISTEN\)")
                .expect("valid address pattern"),
        }
    }

    /// Parse a raw table into services on ports within `ranges`.
    ///
    /// The result holds at most one service per `(pid, port)` and is sorted by
    /// port; services sharing a port keep their table order.
    pub fn parse(&self, table: &str, ranges: &[PortRange]) -> Vec<Service> {
        let mut services = Vec::new();
        let mut seen: HashSet<(String, u16)> = HashSet::new();

        // Skip header line
        for line in table.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }

            let Some(caps) = self.port_re.captures(line) else {
                continue;
            };
            let Ok(port) = caps[1].parse::<u16>() else {
                continue;
            };
            if !in_ranges(ranges, port) {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(name), Some(pid)) = (fields.next(), fields.next()) else {
                continue;
            };

            let address = self
                .address_re
                .captures(line)
                .map(|caps| caps[1].to_string())
                .unwrap_or_else(|| format!("*:{}", port));

            // IPv4 and IPv6 sockets of one process show up as separate lines
            if !seen.insert((pid.to_string(), port)) {
                continue;
            }

            services.push(Service::new(name, pid, port, address));
        }

        services.sort_by_key(|s| s.port);
        services
    }
}

impl Default for ListenerTableParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Discovers development services listening on the configured port ranges.
pub struct PortScanner<S: SocketTablePort> {
    table: Arc<S>,
    parser: ListenerTableParser,
    ranges: Vec<PortRange>,
}

impl<S: SocketTablePort> PortScanner<S> {
    /// Create a scanner over the default development port ranges.
    pub fn new(table: Arc<S>) -> Self {
        Self::with_ranges(table, DEFAULT_PORT_RANGES.to_vec())
    }

    /// Create a scanner over custom port ranges.
    pub fn with_ranges(table: Arc<S>, ranges: Vec<PortRange>) -> Self {
        Self {
            table,
            parser: ListenerTableParser::new(),
            ranges,
        }
    }

    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// Run one discovery pass.
    ///
    /// Enumeration failures abort the pass; an empty list is a success.
    pub async fn discover(&self) -> Result<Vec<Service>> {
        let table = self.table.enumerate_listeners().await?;
        let services = self.parser.parse(&table, &self.ranges);
        debug!(count = services.len(), "Discovered services");
        Ok(services)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HostCall, ScriptedHost};
    use crate::error::Error;

    const HEADER: &str = "COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME";

    fn table(lines: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out
    }

    fn parse(lines: &[&str]) -> Vec<Service> {
        ListenerTableParser::new().parse(&table(lines), &DEFAULT_PORT_RANGES)
    }

    #[test]
    fn test_parse_wildcard_listener() {
        let services =
            parse(&["node      1234  user   12u  IPv4 0x1234      0t0  TCP *:8080 (LISTEN)"]);

        assert_eq!(services, vec![Service::new("node", "1234", 8080, "*:8080")]);
    }

    #[test]
    fn test_parse_specific_addresses() {
        let services = parse(&[
            "python3  2001  user   3u  IPv4 0xaa      0t0  TCP 127.0.0.1:8000 (LISTEN)",
            "node     2002  user   4u  IPv6 0xbb      0t0  TCP [::1]:9000 (LISTEN)",
            "node     2003  user   5u  IPv6 0xcc      0t0  TCP [fe80::1]:9001 (LISTEN)",
        ]);

        assert_eq!(services.len(), 3);
        assert_eq!(services[0].address, "127.0.0.1:8000");
        assert_eq!(services[1].address, "[::1]:9000");
        assert_eq!(services[2].address, "[fe80::1]:9001");
    }

    #[test]
    fn test_header_is_skipped() {
        // A header that happens to look like a listener must still be skipped
        let raw = "node 1 u 1u IPv4 0x1 0t0 TCP *:8080 (LISTEN)\n";
        assert!(ListenerTableParser::new()
            .parse(raw, &DEFAULT_PORT_RANGES)
            .is_empty());
    }

    #[test]
    fn test_lines_without_listen_marker_are_skipped() {
        let services = parse(&[
            "node   1234  user  12u  IPv4 0x1  0t0  TCP 127.0.0.1:8080->127.0.0.1:50000 (ESTABLISHED)",
            "node   1234  user  13u  IPv4 0x1  0t0  TCP *:8080",
            "garbage",
            "",
            "   ",
        ]);
        assert!(services.is_empty());
    }

    #[test]
    fn test_ports_outside_ranges_are_rejected() {
        let services = parse(&[
            "nginx     1  root  6u  IPv4 0x1  0t0  TCP *:80 (LISTEN)",
            "node   3000  user  6u  IPv4 0x1  0t0  TCP *:3000 (LISTEN)",
            "edge   7999  user  6u  IPv4 0x1  0t0  TCP *:7999 (LISTEN)",
            "low    8000  user  6u  IPv4 0x1  0t0  TCP *:8000 (LISTEN)",
            "high   9999  user  6u  IPv4 0x1  0t0  TCP *:9999 (LISTEN)",
            "edge  10000  user  6u  IPv4 0x1  0t0  TCP *:10000 (LISTEN)",
            "huge  70000  user  6u  IPv4 0x1  0t0  TCP *:99999999 (LISTEN)",
        ]);

        let ports: Vec<u16> = services.iter().map(|s| s.port).collect();
        assert_eq!(ports, vec![8000, 9999]);
    }

    #[test]
    fn test_gap_between_ranges_is_rejected() {
        let ranges = [PortRange::new(8000, 8099), PortRange::new(9000, 9999)];
        let services = ListenerTableParser::new().parse(
            &table(&[
                "a  1  u  6u  IPv4 0x1  0t0  TCP *:8500 (LISTEN)",
                "b  2  u  6u  IPv4 0x1  0t0  TCP *:9500 (LISTEN)",
            ]),
            &ranges,
        );
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].port, 9500);
    }

    #[test]
    fn test_duplicate_pid_port_is_collapsed() {
        let services = parse(&[
            "node  1234  user  19u  IPv4 0x1  0t0  TCP 127.0.0.1:9090 (LISTEN)",
            "node  1234  user  20u  IPv6 0x2  0t0  TCP [::1]:9090 (LISTEN)",
        ]);

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].pid, "1234");
        assert_eq!(services[0].port, 9090);
        // First occurrence wins
        assert_eq!(services[0].address, "127.0.0.1:9090");
    }

    #[test]
    fn test_same_process_on_several_ports() {
        let services = parse(&[
            "node  1234  user  19u  IPv4 0x1  0t0  TCP *:8081 (LISTEN)",
            "node  1234  user  20u  IPv4 0x2  0t0  TCP *:8080 (LISTEN)",
            "ruby  4321  user  20u  IPv4 0x3  0t0  TCP *:8080 (LISTEN)",
        ]);

        assert_eq!(services.len(), 3);
        assert_eq!(services[0].port, 8080);
        assert_eq!(services[0].pid, "1234");
        assert_eq!(services[1].port, 8080);
        assert_eq!(services[1].pid, "4321");
        assert_eq!(services[2].port, 8081);
    }

    #[test]
    fn test_output_is_sorted_by_port() {
        let services = parse(&[
            "c  3  u  6u  IPv4 0x1  0t0  TCP *:9500 (LISTEN)",
            "a  1  u  6u  IPv4 0x1  0t0  TCP *:8001 (LISTEN)",
            "b  2  u  6u  IPv4 0x1  0t0  TCP *:8999 (LISTEN)",
            "d  4  u  6u  IPv4 0x1  0t0  TCP *:8000 (LISTEN)",
        ]);

        assert!(services.windows(2).all(|w| w[0].port <= w[1].port));
        assert_eq!(services.first().map(|s| s.port), Some(8000));
        assert_eq!(services.last().map(|s| s.port), Some(9500));
    }

    #[test]
    fn test_non_numeric_pid_is_kept_as_text() {
        let services = parse(&["launcher  -  root  6u  IPv4 0x1  0t0  TCP *:8443 (LISTEN)"]);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].pid, "-");
        assert_eq!(services[0].pid_number(), None);
    }

    #[tokio::test]
    async fn test_discover_uses_socket_table() {
        let host = Arc::new(ScriptedHost::new().with_socket_table(table(&[
            "node  1234  user  12u  IPv4 0x1  0t0  TCP *:8080 (LISTEN)",
        ])));
        let scanner = PortScanner::new(host.clone());

        let services = scanner.discover().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(host.calls(), vec![HostCall::EnumerateListeners]);
    }

    #[tokio::test]
    async fn test_discover_empty_is_success() {
        let scanner = PortScanner::new(Arc::new(ScriptedHost::new()));
        assert!(scanner.discover().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_failure_returns_no_partial_results() {
        let host = Arc::new(ScriptedHost::new().with_failing_socket_table("lsof exited with 2"));
        let scanner = PortScanner::new(host);

        let err = scanner.discover().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
    }
}
