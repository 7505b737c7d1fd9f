//! Check definitions and run state.

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::handler::Handler;

/// Number of exit codes kept in [`CheckState::history`].
pub const HISTORY_LIMIT: usize = 10;

/// Load-time definition of a check. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckDefinition {
    /// Unique check name.
    pub name: String,
    /// Command line, relative to the commands directory.
    pub command: String,
    /// Seconds between runs.
    pub interval: u64,
    /// Failures required before an incident counts as confirmed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Re-alert on a confirmed incident when the output changes.
    #[serde(default)]
    pub renotify: bool,
    /// Names of the handlers to notify, in order.
    #[serde(default)]
    pub handlers: Vec<String>,
}

fn default_max_attempts() -> u32 {
    1
}

impl CheckDefinition {
    pub fn new(name: impl Into<String>, command: impl Into<String>, interval: u64) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            interval,
            max_attempts: default_max_attempts(),
            renotify: false,
            handlers: Vec::new(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_renotify(mut self, renotify: bool) -> Self {
        self.renotify = renotify;
        self
    }

    pub fn with_handlers(mut self, handlers: Vec<String>) -> Self {
        self.handlers = handlers;
        self
    }
}

/// Mutable result fields of the most recent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckState {
    /// Consecutive-failure counter of the open incident.
    #[serde(default)]
    pub attempts: u32,
    /// Last exit code. Zero means success.
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub output: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
    /// Wall-clock run time in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Most recent exit codes, newest first.
    #[serde(default)]
    pub history: Vec<i32>,
}

impl CheckState {
    /// Prepend a status to the history, dropping entries past [`HISTORY_LIMIT`].
    pub fn record_history(&mut self, status: i32) {
        self.history.insert(0, status);
        self.history.truncate(HISTORY_LIMIT);
    }
}

/// A check with its run state and the handlers bound at load time.
#[derive(Debug, Clone)]
pub struct Check {
    pub definition: CheckDefinition,
    pub state: CheckState,
    /// Output of the open incident before the latest run. Never persisted.
    pub previous_output: String,
    handlers: Vec<Arc<Handler>>,
}

impl Check {
    pub fn new(definition: CheckDefinition, handlers: Vec<Arc<Handler>>) -> Self {
        Self {
            definition,
            state: CheckState::default(),
            previous_output: String::new(),
            handlers,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn handlers(&self) -> &[Arc<Handler>] {
        &self.handlers
    }

    pub fn is_failing(&self) -> bool {
        self.state.status != 0
    }
}
