//! Server-wide configuration (§1 ambient stack): the knobs a node is started
//! with, independent of the cluster/replication state it accumulates at
//! runtime. Mirrors the small `Default`-impl-plus-`with_*`-builders shape of
//! [`crate::persistence::PersistenceConfig`], loaded from an optional TOML
//! file given on the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SlotKvError};
use crate::persistence::PersistenceConfig;

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the RESP listener binds to, e.g. `127.0.0.1:6379`.
    pub bind_addr: String,
    /// Cluster bus port offset (spec §4.3): real Redis reserves
    /// `port + 10000` for inter-node gossip. Not dialed by this crate (no
    /// gossip protocol in scope), but reported by `CLUSTER NODES`/`INFO`.
    pub cluster_bus_port_offset: u16,
    /// Capacity in bytes of the replication backlog ring (§3, §4.4).
    pub backlog_capacity: usize,
    /// RDB/AOF file locations and save policy.
    pub persistence: PersistenceConfig,
    /// `tracing` level filter, e.g. `"info"`, `"debug"`.
    pub log_level: String,
    /// Structured logging output format.
    pub log_format: LogFormat,
}

/// Output format for the `tracing_subscriber` layer (§A.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text, the default for local/foreground runs.
    Text,
    /// Newline-delimited JSON, for log-shipping pipelines.
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:6379".to_string(),
            cluster_bus_port_offset: 10000,
            backlog_capacity: crate::replication::DEFAULT_BACKLOG_CAPACITY,
            persistence: PersistenceConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, falling back to `Default` for
    /// any field the file omits.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SlotKvError::Persistence(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&contents)
            .map_err(|e| SlotKvError::Persistence(format!("Invalid config file: {}", e)))
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_backlog_capacity(mut self, capacity: usize) -> Self {
        self.backlog_capacity = capacity;
        self
    }

    pub fn with_rdb_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persistence.rdb_path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_redis_stock_conventions() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:6379");
        assert_eq!(config.cluster_bus_port_offset, 10000);
        assert!(config.backlog_capacity > 0);
        assert!(!config.persistence.enable_aof);
    }

    #[test]
    fn from_file_parses_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotkv.toml");
        std::fs::write(
            &path,
            r#"
            bind_addr = "0.0.0.0:7000"
            cluster_bus_port_offset = 10000
            backlog_capacity = 2048
            log_level = "debug"
            log_format = "json"

            [persistence]
            enable_rdb = true
            rdb_path = "dump.rdb"
            rdb_save_interval = 60
            enable_aof = false
            aof_path = "appendonly.aof"
            aof_sync_policy = "EverySecond"
            "#,
        )
        .unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:7000");
        assert_eq!(config.backlog_capacity, 2048);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn builders_override_defaults() {
        let config = ServerConfig::default()
            .with_bind_addr("10.0.0.1:6380")
            .with_backlog_capacity(4096)
            .with_log_level("warn");
        assert_eq!(config.bind_addr, "10.0.0.1:6380");
        assert_eq!(config.backlog_capacity, 4096);
        assert_eq!(config.log_level, "warn");
    }
}
