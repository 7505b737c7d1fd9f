//! Check command resolution.
//!
//! A check command is a whitespace-separated token list. The first token
//! names an executable inside the commands directory; the rest are passed
//! through as arguments. No shell is involved.

use std::path::{Path, PathBuf};

use vigil_protocols::CheckError;

/// A resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Resolve `command` against `commands_dir`.
    pub fn resolve(commands_dir: &Path, command: &str) -> Result<Self, CheckError> {
        let mut tokens = command.split_whitespace();
        let name = tokens.next().ok_or(CheckError::EmptyCommand)?;

        Ok(Self {
            program: commands_dir.join(name),
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// Whether the program exists on disk.
    pub fn exists(&self) -> bool {
        self.program.is_file()
    }
}
