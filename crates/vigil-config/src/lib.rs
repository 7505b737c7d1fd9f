//! # Vigil Config
//!
//! Daemon configuration (TOML) and check/handler definition loading (JSON).

mod definitions;
mod error;
mod loader;
mod schema;
mod validator;

pub use definitions::{DefinitionFile, DefinitionLoader, HandlerDefinition};
pub use error::{ConfigError, DefinitionError};
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
