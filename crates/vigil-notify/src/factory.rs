//! Builds senders from handler definitions.

use std::sync::Arc;

use vigil_protocols::{SendError, Sender};

use crate::console::ConsoleSender;
use crate::sendgrid::{SendGridConfig, SendGridSender};
use crate::slack::{SlackConfig, SlackSender};

/// Handler types the factory knows.
pub const SENDER_KINDS: [&str; 3] = ["console", "slack", "sendgrid"];

/// Build the sender for a handler `kind` from its configuration payload.
///
/// Unknown kinds and malformed payloads are configuration errors.
pub fn build_sender(kind: &str, config: serde_json::Value) -> Result<Arc<dyn Sender>, SendError> {
    let invalid = |e: serde_json::Error| SendError::InvalidConfig(format!("{}: {}", kind, e));

    match kind {
        "console" => Ok(Arc::new(ConsoleSender::new())),
        "slack" => {
            let config: SlackConfig = serde_json::from_value(config).map_err(invalid)?;
            Ok(Arc::new(SlackSender::new(config)?))
        }
        "sendgrid" => {
            let config: SendGridConfig = serde_json::from_value(config).map_err(invalid)?;
            Ok(Arc::new(SendGridSender::new(config)?))
        }
        other => Err(SendError::InvalidConfig(format!(
            "unknown handler type '{}'",
            other
        ))),
    }
}
