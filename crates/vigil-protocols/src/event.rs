//! Per-run events.

use chrono::{DateTime, Utc};

use crate::check::Check;

/// Generate a short opaque identifier.
pub fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// One pass of the incident state machine, built from a just-executed check.
///
/// Events are never persisted; they are dropped once processed.
#[derive(Debug)]
pub struct Event<'a> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub check: &'a mut Check,
}

impl<'a> Event<'a> {
    pub fn new(check: &'a mut Check) -> Self {
        Self {
            id: short_id(),
            created_at: Utc::now(),
            check,
        }
    }
}
