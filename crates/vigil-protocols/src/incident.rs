//! Persisted incidents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::check::{Check, CheckDefinition, CheckState};
use crate::event::short_id;

/// Record of an open failure streak for exactly one check.
///
/// Stored documents are keyed by the owning check's name; at most one
/// incident exists per name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: String,
    #[serde(flatten)]
    pub definition: CheckDefinition,
    #[serde(flatten)]
    pub state: CheckState,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Incident {
    /// Open an incident for a failing check, resetting its attempt counter to 1.
    pub fn open(check: &mut Check) -> Self {
        check.state.attempts = 1;
        Self {
            id: short_id(),
            definition: check.definition.clone(),
            state: check.state.clone(),
            created_at: Utc::now(),
            last_updated_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Record one more failing run.
    pub fn record_failure(&mut self, output: &str) {
        self.state.output = output.to_string();
        self.state.attempts += 1;
        self.last_updated_at = Some(Utc::now());
    }

    /// Whether the failure streak reached the check's `max_attempts`.
    pub fn is_confirmed(&self) -> bool {
        self.state.attempts >= self.definition.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_check() -> Check {
        let mut check = Check::new(
            CheckDefinition::new("disk-check", "check_disk", 5).with_max_attempts(2),
            Vec::new(),
        );
        check.state.status = 1;
        check.state.output = "92% full".to_string();
        check.state.attempts = 7;
        check
    }

    #[test]
    fn test_open_resets_attempts() {
        let mut check = failing_check();
        let incident = Incident::open(&mut check);

        assert_eq!(check.state.attempts, 1);
        assert_eq!(incident.state.attempts, 1);
        assert_eq!(incident.name(), "disk-check");
        assert_eq!(incident.state.output, "92% full");
        assert!(!incident.id.is_empty());
        assert!(incident.last_updated_at.is_none());
    }

    #[test]
    fn test_record_failure() {
        let mut check = failing_check();
        let mut incident = Incident::open(&mut check);
        assert!(!incident.is_confirmed());

        incident.record_failure("95% full");
        assert_eq!(incident.state.attempts, 2);
        assert_eq!(incident.state.output, "95% full");
        assert!(incident.last_updated_at.is_some());
        assert!(incident.is_confirmed());
    }

    #[test]
    fn test_document_is_flat() {
        let mut check = failing_check();
        let incident = Incident::open(&mut check);
        let json = serde_json::to_value(&incident).unwrap();

        assert_eq!(json["name"], "disk-check");
        assert_eq!(json["attempts"], 1);
        assert_eq!(json["max_attempts"], 2);
        assert!(json.get("previous_output").is_none());

        let back: Incident = serde_json::from_value(json).unwrap();
        assert_eq!(back, incident);
    }
}
