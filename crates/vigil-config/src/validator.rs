//! Configuration validation.

use crate::schema::{Config, StorageBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_paths(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_delivery(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_paths(config: &Config, result: &mut ValidationResult) {
        let paths = [
            ("paths.checks", &config.paths.checks),
            ("paths.commands", &config.paths.commands),
            ("paths.handlers", &config.paths.handlers),
        ];
        for (key, path) in paths {
            if path.as_os_str().is_empty() {
                result.add_error(ValidationError::new(key, "Path cannot be empty"));
            }
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.operation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "storage.operation_timeout_secs",
                "operation_timeout_secs must be greater than 0",
            ));
        }

        if config.storage.backend == StorageBackend::File && config.storage.path.as_os_str().is_empty() {
            result.add_error(ValidationError::new(
                "storage.path",
                "File backend requires a path",
            ));
        }

        if config.storage.backend == StorageBackend::Memory {
            result.add_warning(ValidationWarning::new(
                "storage.backend",
                "Memory backend loses open incidents on restart",
            ));
        }
    }

    fn validate_delivery(config: &Config, result: &mut ValidationResult) {
        if !config.delivery.deliver_all && config.delivery.statuses.is_empty() {
            result.add_warning(ValidationWarning::new(
                "delivery.statuses",
                "No status is deliverable, notifications will never be sent",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
