//! Caller-facing service operations.

use std::sync::Arc;

use crate::config::{Config, LifecycleTimings};
use crate::domain::{RestartOutcome, Service, StopOutcome};
use crate::error::Result;
use crate::ports::{ProcessHostPort, SocketTablePort};

use super::controller::ProcessController;
use super::scanner::PortScanner;

/// Entry point for presentation layers: list, stop and restart services.
///
/// Holds no state between calls; every listing is a fresh scan.
pub struct ServiceManager<S: SocketTablePort, H: ProcessHostPort> {
    scanner: PortScanner<S>,
    controller: ProcessController<H>,
}

impl<S: SocketTablePort, H: ProcessHostPort> ServiceManager<S, H> {
    /// Create a manager over the given OS capabilities.
    pub fn new(table: Arc<S>, host: Arc<H>, config: &Config) -> Self {
        Self {
            scanner: PortScanner::with_ranges(table, config.port_ranges.clone()),
            controller: ProcessController::new(host, config.timings()),
        }
    }

    pub fn timings(&self) -> LifecycleTimings {
        self.controller.timings()
    }

    /// Discover services, sorted by port.
    pub async fn list_services(&self) -> Result<Vec<Service>> {
        self.scanner.discover().await
    }

    /// Gracefully stop the process `pid`.
    pub async fn stop_service(&self, pid: u32) -> Result<StopOutcome> {
        self.controller.stop(pid).await
    }

    /// Stop the process `pid` and relaunch its command line.
    pub async fn restart_service(&self, pid: u32) -> Result<RestartOutcome> {
        self.controller.restart(pid).await
    }
}

/// Manager wired to the real operating system.
#[cfg(unix)]
pub type SystemServiceManager =
    ServiceManager<crate::adapters::LsofSocketTable, crate::adapters::UnixProcessHost>;

#[cfg(unix)]
impl SystemServiceManager {
    /// Create a manager that uses lsof, ps, signals and the configured shell.
    pub fn system(config: &Config) -> Self {
        Self::new(
            Arc::new(crate::adapters::LsofSocketTable::new()),
            Arc::new(crate::adapters::UnixProcessHost::with_shell(config.shell.clone())),
            config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{HostCall, ScriptedHost};
    use crate::domain::{PortRange, SignalKind};
    use crate::error::ErrorKind;

    const TABLE: &str = "\
COMMAND    PID  USER   FD   TYPE  DEVICE SIZE/OFF NODE NAME
python3   5555  user    3u  IPv4  0x1      0t0  TCP 127.0.0.1:8000 (LISTEN)
node      1234  user   12u  IPv4  0x2      0t0  TCP *:8080 (LISTEN)
node      1234  user   13u  IPv6  0x3      0t0  TCP *:8080 (LISTEN)
postgres   999  pg      5u  IPv4  0x4      0t0  TCP 127.0.0.1:5432 (LISTEN)
";

    fn manager(host: &Arc<ScriptedHost>, config: &Config) -> ServiceManager<ScriptedHost, ScriptedHost> {
        ServiceManager::new(host.clone(), host.clone(), config)
    }

    #[tokio::test]
    async fn test_list_services() {
        let host = Arc::new(ScriptedHost::new().with_socket_table(TABLE));
        let services = manager(&host, &Config::default()).list_services().await.unwrap();

        assert_eq!(
            services,
            vec![
                Service::new("python3", "5555", 8000, "127.0.0.1:8000"),
                Service::new("node", "1234", 8080, "*:8080"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_services_uses_configured_ranges() {
        let host = Arc::new(ScriptedHost::new().with_socket_table(TABLE));
        let config = Config {
            port_ranges: vec![PortRange::new(5000, 5999)],
            ..Config::default()
        };

        let services = manager(&host, &config).list_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "postgres");
    }

    #[tokio::test]
    async fn test_listing_is_rebuilt_on_every_call() {
        let host = Arc::new(ScriptedHost::new().with_socket_table(TABLE));
        let manager = manager(&host, &Config::default());

        manager.list_services().await.unwrap();
        manager.list_services().await.unwrap();

        assert_eq!(
            host.calls(),
            vec![HostCall::EnumerateListeners, HostCall::EnumerateListeners]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_then_list() {
        let host = Arc::new(
            ScriptedHost::new()
                .with_socket_table(TABLE)
                .with_process(5555, "python app.py"),
        );
        let manager = manager(&host, &Config::default());

        let outcome = manager.restart_service(5555).await.unwrap();
        assert_eq!(outcome.command, "python app.py");
        assert_eq!(host.signals(), vec![(5555, SignalKind::Terminate)]);

        let services = manager.list_services().await.unwrap();
        assert!(services.iter().any(|s| s.port == 8000));
    }

    #[tokio::test]
    async fn test_stop_own_process_is_forbidden() {
        let host = Arc::new(ScriptedHost::new());
        let err = manager(&host, &Config::default())
            .stop_service(std::process::id())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SelfOperationForbidden);
        assert!(host.signals().is_empty());
    }

    #[test]
    fn test_timings_come_from_config() {
        let host = Arc::new(ScriptedHost::new());
        let config = Config {
            stop_timeout_ms: 100,
            ..Config::default()
        };
        let manager = manager(&host, &config);
        assert_eq!(manager.timings(), config.timings());
    }
}
