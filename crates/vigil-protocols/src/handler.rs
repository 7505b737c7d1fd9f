//! Notification handlers and the sender capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SendError;
use crate::message::Message;

/// Delivery capability implemented by every sender variant.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Variant tag, e.g. `console` or `slack`.
    fn kind(&self) -> &str;

    /// Deliver a message.
    async fn send(&self, message: &Message) -> Result<(), SendError>;
}

/// A named sender. Created once at load time and shared by the checks bound to it.
#[derive(Clone)]
pub struct Handler {
    name: String,
    sender: Arc<dyn Sender>,
}

impl Handler {
    pub fn new(name: impl Into<String>, sender: Arc<dyn Sender>) -> Self {
        Self {
            name: name.into(),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        self.sender.kind()
    }

    pub async fn send(&self, message: &Message) -> Result<(), SendError> {
        self.sender.send(message).await
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("kind", &self.sender.kind())
            .finish()
    }
}
