//! Handler registry.
//!
//! Every handler is registered once at load time and then shared by the
//! checks that name it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use vigil_protocols::{Check, CheckDefinition, Handler, RegistryError};

/// Thread-safe, name-keyed registry of handlers.
///
/// A single lock covers both registration and lookup, so concurrent
/// registration of the same name cannot slip past the duplicate check.
pub struct HandlerRegistry {
    handlers: Mutex<HashMap<String, Arc<Handler>>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a handler.
    ///
    /// Returns an error if a handler with the same name is already registered.
    pub fn register(&self, handler: Handler) -> Result<Arc<Handler>, RegistryError> {
        let mut handlers = self.handlers.lock();
        debug!("Registering handler '{}'", handler.name());

        if handlers.contains_key(handler.name()) {
            return Err(RegistryError::DuplicateName(handler.name().to_string()));
        }

        let handler = Arc::new(handler);
        handlers.insert(handler.name().to_string(), handler.clone());
        Ok(handler)
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Result<Arc<Handler>, RegistryError> {
        self.handlers
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Resolve a list of names, failing on the first unknown one.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Arc<Handler>>, RegistryError> {
        names.iter().map(|name| self.get(name)).collect()
    }

    /// Build a check with its handlers bound.
    pub fn bind(&self, definition: CheckDefinition) -> Result<Check, RegistryError> {
        let handlers = self.resolve(&definition.handlers)?;
        Ok(Check::new(definition, handlers))
    }

    /// Check if a handler with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.lock().contains_key(name)
    }

    /// List all handlers, sorted by name.
    pub fn list(&self) -> Vec<Arc<Handler>> {
        let mut handlers: Vec<_> = self.handlers.lock().values().cloned().collect();
        handlers.sort_by(|a, b| a.name().cmp(b.name()));
        handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
