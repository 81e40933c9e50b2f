//! Configuration for discovery and lifecycle timings.
//!
//! Stored in JSON format at `~/.devport/config.json`. Every field has a default,
//! so a missing file or a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{PortRange, DEFAULT_PORT_RANGES};
use crate::error::{Error, Result};

/// Grace period between SIGTERM and SIGKILL.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// Pause after a stop so the OS can release the listening port.
pub const DEFAULT_PORT_RELEASE_DELAY: Duration = Duration::from_millis(500);

/// Pause after a relaunch so the new process can bind its port.
pub const DEFAULT_RELAUNCH_SETTLE: Duration = Duration::from_secs(1);

/// Interpreter used to relaunch captured command lines.
pub const DEFAULT_SHELL: &str = "bash";

/// Fixed delays used by the process controller.
///
/// These are heuristics, not confirmed port release/bind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimings {
    pub stop_timeout: Duration,
    pub port_release_delay: Duration,
    pub relaunch_settle: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        Self {
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            port_release_delay: DEFAULT_PORT_RELEASE_DELAY,
            relaunch_settle: DEFAULT_RELAUNCH_SETTLE,
        }
    }
}

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Ports outside these ranges are never reported.
    #[serde(default = "default_port_ranges")]
    pub port_ranges: Vec<PortRange>,

    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    #[serde(default = "default_port_release_delay_ms")]
    pub port_release_delay_ms: u64,

    #[serde(default = "default_relaunch_settle_ms")]
    pub relaunch_settle_ms: u64,

    /// Shell used for `<shell> -c "<command> &"` relaunches.
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_port_ranges() -> Vec<PortRange> {
    DEFAULT_PORT_RANGES.to_vec()
}

fn default_stop_timeout_ms() -> u64 {
    DEFAULT_STOP_TIMEOUT.as_millis() as u64
}

fn default_port_release_delay_ms() -> u64 {
    DEFAULT_PORT_RELEASE_DELAY.as_millis() as u64
}

fn default_relaunch_settle_ms() -> u64 {
    DEFAULT_RELAUNCH_SETTLE.as_millis() as u64
}

fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_ranges: default_port_ranges(),
            stop_timeout_ms: default_stop_timeout_ms(),
            port_release_delay_ms: default_port_release_delay_ms(),
            relaunch_settle_ms: default_relaunch_settle_ms(),
            shell: default_shell(),
        }
    }
}

impl Config {
    /// Lifecycle delays derived from this configuration.
    pub fn timings(&self) -> LifecycleTimings {
        LifecycleTimings {
            stop_timeout: Duration::from_millis(self.stop_timeout_ms),
            port_release_delay: Duration::from_millis(self.port_release_delay_ms),
            relaunch_settle: Duration::from_millis(self.relaunch_settle_ms),
        }
    }

    /// Reject configurations the scanner and controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.port_ranges.is_empty() {
            return Err(Error::Config("portRanges must not be empty".to_string()));
        }
        if let Some(range) = self.port_ranges.iter().find(|r| !r.is_valid()) {
            return Err(Error::Config(format!(
                "Invalid port range {}: start is greater than end",
                range
            )));
        }
        if self.shell.trim().is_empty() {
            return Err(Error::Config("shell must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration store backed by a JSON file.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.devport/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".devport").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            fs::create_dir_all(config_dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write to a temp file then rename so readers never see a partial file
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio_test::assert_err;

    fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store();
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timings(), LifecycleTimings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store();

        let config = Config {
            port_ranges: vec![PortRange::new(3000, 3999)],
            stop_timeout_ms: 1500,
            ..Config::default()
        };

        store.save(&config).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.timings().stop_timeout, Duration::from_millis(1500));
        assert_eq!(loaded.timings().relaunch_settle, DEFAULT_RELAUNCH_SETTLE);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{ "portReleaseDelayMs": 250 }"#).unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.port_ranges, DEFAULT_PORT_RANGES.to_vec());
        assert_eq!(config.timings().port_release_delay, Duration::from_millis(250));
        assert_eq!(config.shell, "bash");
    }

    #[tokio::test]
    async fn test_invalid_range_rejected() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{ "portRanges": [{ "start": 9000, "end": 8000 }] }"#,
        )
        .unwrap();

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_err!(store.load().await);
    }

    #[test]
    fn test_empty_ranges_invalid() {
        let config = Config {
            port_ranges: Vec::new(),
            ..Config::default()
        };
        assert_err!(config.validate());
    }
}
