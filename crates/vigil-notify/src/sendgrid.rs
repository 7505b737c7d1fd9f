//! SendGrid email sender.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use vigil_protocols::{Message, MessageType, SendError, Sender};

const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

fn default_true() -> bool {
    true
}

/// SendGrid handler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SendGridConfig {
    #[serde(alias = "apiKey")]
    pub api_key: String,
    #[serde(default, alias = "subjectPrefix")]
    pub subject_prefix: String,
    pub from: String,
    #[serde(default, alias = "fromName")]
    pub from_name: String,
    pub to: String,
    #[serde(default, alias = "toName")]
    pub to_name: String,
    /// When false, `resolve` messages are not emailed.
    #[serde(default = "default_true", alias = "notifyOnResolve")]
    pub notify_on_resolve: bool,
    #[serde(default, alias = "apiUrl")]
    pub api_url: Option<String>,
}

/// Emails messages through the SendGrid v3 mail API.
pub struct SendGridSender {
    config: SendGridConfig,
    endpoint: String,
    client: reqwest::Client,
}

impl SendGridSender {
    pub fn new(config: SendGridConfig) -> Result<Self, SendError> {
        if config.api_key.is_empty() {
            return Err(SendError::InvalidConfig("sendgrid 'api_key' is empty".to_string()));
        }

        let endpoint = format!(
            "{}/v3/mail/send",
            config
                .api_url
                .as_deref()
                .unwrap_or(SENDGRID_API_URL)
                .trim_end_matches('/')
        );

        Ok(Self {
            config,
            endpoint,
            client: crate::http_client()?,
        })
    }

    fn subject(&self, message: &Message) -> String {
        if self.config.subject_prefix.is_empty() {
            message.title.clone()
        } else {
            format!("{} {}", self.config.subject_prefix, message.title)
        }
    }

    fn payload(&self, message: &Message) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{
                "to": [{ "email": self.config.to, "name": self.config.to_name }]
            }],
            "from": { "email": self.config.from, "name": self.config.from_name },
            "subject": self.subject(message),
            "content": [{ "type": "text/plain", "value": message.body }]
        })
    }
}

#[async_trait]
impl Sender for SendGridSender {
    fn kind(&self) -> &str {
        "sendgrid"
    }

    async fn send(&self, message: &Message) -> Result<(), SendError> {
        if message.kind == MessageType::Resolve && !self.config.notify_on_resolve {
            debug!("Skipping resolve email to {}", self.config.to);
            return Ok(());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| SendError::Request(format!("SendGrid request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!("SendGrid accepted message with status {}", status);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
#[path = "sendgrid_tests.rs"]
mod tests;
