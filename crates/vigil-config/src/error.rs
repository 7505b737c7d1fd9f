//! Configuration and definition errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// A definition file that could not be loaded. The whole file is rejected.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed definition file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid definition '{name}' in {}: {message}", path.display())]
    InvalidEntry {
        path: PathBuf,
        name: String,
        message: String,
    },
}

impl DefinitionError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            DefinitionError::Scan { path, .. }
            | DefinitionError::Read { path, .. }
            | DefinitionError::Parse { path, .. }
            | DefinitionError::InvalidEntry { path, .. } => path,
        }
    }
}
