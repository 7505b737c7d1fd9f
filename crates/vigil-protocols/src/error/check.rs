//! Check execution errors.
//!
//! Any of these abandons the run: no event is fired and the check keeps its
//! last known state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to start '{command}': {reason}")]
    Spawn { command: String, reason: String },

    #[error("Command '{command}' exceeded its {secs}s deadline")]
    Timeout { command: String, secs: u64 },

    #[error("Empty command")]
    EmptyCommand,
}
