//! Configuration schema definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP API listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Definition and command folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_checks_path")]
    pub checks: PathBuf,

    #[serde(default = "default_commands_path")]
    pub commands: PathBuf,

    #[serde(default = "default_handlers_path")]
    pub handlers: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            checks: default_checks_path(),
            commands: default_commands_path(),
            handlers: default_handlers_path(),
        }
    }
}

fn default_checks_path() -> PathBuf {
    PathBuf::from("./definitions/checks")
}

fn default_commands_path() -> PathBuf {
    PathBuf::from("./definitions/commands")
}

fn default_handlers_path() -> PathBuf {
    PathBuf::from("./definitions/handlers")
}

/// Overlapping runs of one check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapMode {
    #[default]
    Allow,
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub run_on_start: bool,

    #[serde(default)]
    pub overlap: OverlapMode,

    /// Per-run command deadline in seconds; 0 disables it.
    #[serde(default)]
    pub command_timeout_secs: u64,
}

impl SchedulerConfig {
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_on_start: true,
            overlap: OverlapMode::default(),
            command_timeout_secs: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

/// Incident storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory used by the file backend.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,

    /// Bound on initial connection; 0 waits indefinitely.
    #[serde(default)]
    pub connect_timeout_secs: u64,
}

impl StorageConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
            operation_timeout_secs: default_operation_timeout(),
            connect_timeout_secs: 0,
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/incidents")
}

fn default_operation_timeout() -> u64 {
    10
}

/// Which runs may notify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    #[serde(default = "default_statuses")]
    pub statuses: Vec<i32>,

    #[serde(default)]
    pub deliver_all: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            statuses: default_statuses(),
            deliver_all: false,
        }
    }
}

fn default_statuses() -> Vec<i32> {
    vec![0, 2]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Daily rolling log files are written here when set.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
