//! Standard output sender.

use async_trait::async_trait;

use vigil_protocols::{Message, SendError, Sender};

/// Prints each message as `<title>: <body>` on standard output.
#[derive(Debug, Default, Clone)]
pub struct ConsoleSender;

impl ConsoleSender {
    pub fn new() -> Self {
        Self
    }

    pub fn format(message: &Message) -> String {
        format!("{}: {}", message.title, message.body)
    }
}

#[async_trait]
impl Sender for ConsoleSender {
    fn kind(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &Message) -> Result<(), SendError> {
        println!("{}", Self::format(message));
        Ok(())
    }
}
