//! Handler registration and check binding at startup.
//!
//! Definition files are applied one at a time. A file whose handlers cannot
//! all be built, or whose checks reference an unknown handler, is skipped as
//! a whole and the error is logged.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use vigil_config::{DefinitionFile, DefinitionLoader, HandlerDefinition};
use vigil_core::HandlerRegistry;
use vigil_notify::{build_sender, ConsoleSender};
use vigil_protocols::{Check, CheckDefinition, Handler, RegistryError};

/// Name of the handler that is always available.
pub(crate) const CONSOLE_HANDLER: &str = "console";

/// Register the built-in console handler.
pub(crate) fn register_console(registry: &HandlerRegistry) -> Result<(), RegistryError> {
    registry.register(Handler::new(CONSOLE_HANDLER, Arc::new(ConsoleSender::new())))?;
    Ok(())
}

/// Build and register every handler defined under `dir`. Returns how many were added.
pub(crate) fn register_handlers(registry: &HandlerRegistry, dir: &Path) -> usize {
    let mut registered = 0;
    for file in DefinitionLoader::load_handlers(dir) {
        match file {
            Ok(file) => match register_handler_file(registry, file) {
                Ok(count) => registered += count,
                Err(e) => error!("{}", e),
            },
            Err(e) => error!("Skipping handler definitions: {}", e),
        }
    }
    info!("Registered {} handlers from {:?}", registered, dir);
    registered
}

fn register_handler_file(
    registry: &HandlerRegistry,
    file: DefinitionFile<HandlerDefinition>,
) -> Result<usize, String> {
    let skip = |reason: String| format!("Skipping handler definitions in {:?}: {}", file.path, reason);

    let mut names = HashSet::new();
    let mut handlers = Vec::with_capacity(file.definitions.len());
    for definition in &file.definitions {
        if registry.contains(&definition.name) || !names.insert(definition.name.as_str()) {
            return Err(skip(RegistryError::DuplicateName(definition.name.clone()).to_string()));
        }
        let sender = build_sender(&definition.kind, definition.config.clone())
            .map_err(|e| skip(format!("handler '{}': {}", definition.name, e)))?;
        handlers.push(Handler::new(definition.name.clone(), sender));
    }

    let mut count = 0;
    for handler in handlers {
        let name = handler.name().to_string();
        match registry.register(handler) {
            Ok(handler) => {
                info!("Registered handler '{}' ({})", name, handler.kind());
                count += 1;
            }
            Err(e) => warn!("Handler '{}' not registered: {}", name, e),
        }
    }
    Ok(count)
}

/// Load check definitions under `dir` and bind them to registered handlers.
///
/// A check name already bound from an earlier accepted file is dropped with a
/// warning. Names from skipped files are not reserved.
pub(crate) fn bind_checks(registry: &HandlerRegistry, dir: &Path) -> Vec<Check> {
    let mut checks = Vec::new();
    let mut bound_names = HashSet::new();
    for file in DefinitionLoader::load_checks(dir) {
        match file {
            Ok(file) => {
                let path = file.path.clone();
                match bind_check_file(registry, file) {
                    Ok(bound) => {
                        for check in bound {
                            if bound_names.insert(check.name().to_string()) {
                                checks.push(check);
                            } else {
                                warn!("Check '{}' in {:?} is already defined, ignoring it", check.name(), path);
                            }
                        }
                    }
                    Err(e) => error!("{}", e),
                }
            }
            Err(e) => error!("Skipping check definitions: {}", e),
        }
    }
    info!("Loaded {} checks from {:?}", checks.len(), dir);
    checks
}

fn bind_check_file(
    registry: &HandlerRegistry,
    file: DefinitionFile<CheckDefinition>,
) -> Result<Vec<Check>, String> {
    let path = file.path;
    file.definitions
        .into_iter()
        .map(|definition| {
            let name = definition.name.clone();
            registry.bind(definition).map_err(|e| {
                format!("Skipping check definitions in {:?}: check '{}': {}", path, name, e)
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "register_tests.rs"]
mod tests;
