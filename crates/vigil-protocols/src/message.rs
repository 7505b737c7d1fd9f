//! Notification messages.

use serde::{Deserialize, Serialize};

use crate::incident::Incident;

/// Kind of notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// An incident started or got worse.
    New,
    /// An incident was resolved.
    Resolve,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::New => write!(f, "new"),
            MessageType::Resolve => write!(f, "resolve"),
        }
    }
}

/// A notification handed to senders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub title: String,
    pub body: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
}

impl Message {
    pub fn new(title: impl Into<String>, body: impl Into<String>, kind: MessageType) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind,
        }
    }

    /// Message for a freshly opened incident.
    pub fn incident_started(incident: &Incident) -> Self {
        Self::new(
            format!(
                "Incident '{}' started - Check '{}' failed after {} attempts",
                incident.id,
                incident.name(),
                incident.state.attempts
            ),
            incident.state.output.clone(),
            MessageType::New,
        )
    }

    /// Message for a confirmed incident whose output changed.
    pub fn incident_updated(incident: &Incident) -> Self {
        Self::new(
            format!(
                "Incident '{}' updated - Check '{}' failed with a different output",
                incident.id,
                incident.name()
            ),
            incident.state.output.clone(),
            MessageType::New,
        )
    }

    /// Message for a resolved incident. The body is the passing run's output.
    pub fn incident_resolved(incident: &Incident, output: &str) -> Self {
        Self::new(
            format!(
                "Incident '{}' resolved - Check '{}' passed",
                incident.id,
                incident.name()
            ),
            output,
            MessageType::Resolve,
        )
    }
}
