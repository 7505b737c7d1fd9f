//! Handler registry errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Handler with name '{0}' already registered")]
    DuplicateName(String),

    #[error("No handler with the name '{0}' found")]
    NotFound(String),
}
