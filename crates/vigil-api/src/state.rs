//! Application state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use vigil_core::{HandlerRegistry, STORAGE_DEADLINE};
use vigil_protocols::Storage;

/// Application state shared across handlers.
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub registry: Arc<HandlerRegistry>,
    storage_deadline: Duration,
    start_time: Instant,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            storage,
            registry,
            storage_deadline: STORAGE_DEADLINE,
            start_time: Instant::now(),
        }
    }

    pub fn with_storage_deadline(mut self, deadline: Duration) -> Self {
        self.storage_deadline = deadline;
        self
    }

    pub fn storage_deadline(&self) -> Duration {
        self.storage_deadline
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
