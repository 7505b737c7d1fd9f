//! CLI definitions for Vigil.

use std::path::PathBuf;

use clap::Parser;
use vigil_config::Config;

/// Vigil CLI.
#[derive(Debug, Parser)]
#[command(name = "vigil")]
#[command(about = "Run checks on a schedule and notify on incidents")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (defaults apply when it does not exist)
    #[arg(short, long, env = "VIGIL_CONFIG", default_value = "config/vigil.toml")]
    pub config: PathBuf,

    /// API host
    #[arg(long, env = "VIGIL_HOST")]
    pub host: Option<String>,

    /// API port
    #[arg(long, env = "VIGIL_PORT")]
    pub port: Option<u16>,

    /// Folder holding check definitions
    #[arg(long, env = "VIGIL_CHECKS_PATH")]
    pub checks_path: Option<PathBuf>,

    /// Folder holding check commands
    #[arg(long, env = "VIGIL_COMMANDS_PATH")]
    pub commands_path: Option<PathBuf>,

    /// Folder holding handler definitions
    #[arg(long, env = "VIGIL_HANDLERS_PATH")]
    pub handlers_path: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long, env = "VIGIL_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Overlay command-line values on a loaded configuration.
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = &self.checks_path {
            config.paths.checks = path.clone();
        }
        if let Some(path) = &self.commands_path {
            config.paths.commands = path.clone();
        }
        if let Some(path) = &self.handlers_path {
            config.paths.handlers = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
