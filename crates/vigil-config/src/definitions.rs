//! Check and handler definition files.
//!
//! Every `*.json` file below a definitions folder is one JSON object whose
//! keys are definition names. A file is accepted or rejected as a whole.
//!
//! ```json
//! {
//!   "disk-check": { "command": "check_disk -w 80", "interval": 5, "handlers": ["console"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use walkdir::WalkDir;

use vigil_protocols::CheckDefinition;

use crate::error::DefinitionError;

/// A handler as written in a definition file, before its sender is built.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerDefinition {
    pub name: String,
    pub kind: String,
    /// Every key except `type`.
    pub config: Value,
}

/// The definitions read from one file.
#[derive(Debug, Clone)]
pub struct DefinitionFile<T> {
    pub path: PathBuf,
    pub definitions: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CheckEntry {
    command: String,
    interval: u64,
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,
    #[serde(default)]
    renotify: bool,
    #[serde(default)]
    handlers: Vec<String>,
}

fn default_max_attempts() -> u32 {
    1
}

/// Reads definition folders.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// All `*.json` files below `dir`, in path order.
    pub fn files(dir: &Path) -> Result<Vec<PathBuf>, DefinitionError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| DefinitionError::Scan {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Load handler definitions, one result per file.
    pub fn load_handlers(dir: &Path) -> Vec<Result<DefinitionFile<HandlerDefinition>, DefinitionError>> {
        Self::load(dir, "handler", |path, content| Self::parse_handlers(path, content))
    }

    /// Load check definitions, one result per file.
    ///
    /// Names repeated across files are returned as written; the caller keeps
    /// the first one it accepts.
    pub fn load_checks(dir: &Path) -> Vec<Result<DefinitionFile<CheckDefinition>, DefinitionError>> {
        Self::load(dir, "check", |path, content| Self::parse_checks(path, content))
    }

    fn load<T>(
        dir: &Path,
        what: &str,
        parse: impl Fn(&Path, &str) -> Result<Vec<T>, DefinitionError>,
    ) -> Vec<Result<DefinitionFile<T>, DefinitionError>> {
        debug!("Reading {} definitions from {:?}", what, dir);

        let files = match Self::files(dir) {
            Ok(files) => files,
            Err(e) => return vec![Err(e)],
        };
        if files.is_empty() {
            info!("No {} definitions found in {:?}", what, dir);
        }

        files
            .into_iter()
            .map(|path| {
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    DefinitionError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                let definitions = parse(&path, &content)?;
                Ok(DefinitionFile { path, definitions })
            })
            .collect()
    }

    fn parse_object(path: &Path, content: &str) -> Result<Map<String, Value>, DefinitionError> {
        serde_json::from_str(content).map_err(|e| DefinitionError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse the check definitions of one file.
    pub fn parse_checks(path: &Path, content: &str) -> Result<Vec<CheckDefinition>, DefinitionError> {
        let invalid = |name: &str, message: String| DefinitionError::InvalidEntry {
            path: path.to_path_buf(),
            name: name.to_string(),
            message,
        };

        Self::parse_object(path, content)?
            .into_iter()
            .map(|(name, value)| {
                let entry: CheckEntry =
                    serde_json::from_value(value).map_err(|e| invalid(&name, e.to_string()))?;

                if entry.command.trim().is_empty() {
                    return Err(invalid(&name, "command cannot be empty".to_string()));
                }
                if entry.interval == 0 {
                    return Err(invalid(&name, "interval must be a positive number of seconds".to_string()));
                }
                if entry.max_attempts == 0 {
                    return Err(invalid(&name, "max_attempts must be at least 1".to_string()));
                }

                Ok(CheckDefinition::new(name, entry.command, entry.interval)
                    .with_max_attempts(entry.max_attempts)
                    .with_renotify(entry.renotify)
                    .with_handlers(entry.handlers))
            })
            .collect()
    }

    /// Parse the handler definitions of one file.
    pub fn parse_handlers(path: &Path, content: &str) -> Result<Vec<HandlerDefinition>, DefinitionError> {
        let invalid = |name: &str, message: &str| DefinitionError::InvalidEntry {
            path: path.to_path_buf(),
            name: name.to_string(),
            message: message.to_string(),
        };

        Self::parse_object(path, content)?
            .into_iter()
            .map(|(name, value)| {
                let Value::Object(mut fields) = value else {
                    return Err(invalid(&name, "handler must be an object"));
                };
                let kind = match fields.remove("type") {
                    Some(Value::String(kind)) => kind,
                    Some(_) => return Err(invalid(&name, "type must be a string")),
                    None => return Err(invalid(&name, "missing field `type`")),
                };

                Ok(HandlerDefinition {
                    name,
                    kind,
                    config: Value::Object(fields),
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "definitions_tests.rs"]
mod tests;
