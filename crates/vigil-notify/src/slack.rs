//! Slack sender.
//!
//! Posts an attachment either through the Web API (`chat.postMessage`,
//! authenticated with a bot token) or to an incoming webhook.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use vigil_protocols::{Message, MessageType, SendError, Sender};

const SLACK_API_URL: &str = "https://slack.com/api";

const COLOR_NEW: &str = "#DF0101";
const COLOR_RESOLVE: &str = "#33FF33";

/// Slack handler configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, alias = "webhookUrl")]
    pub webhook_url: Option<String>,
    #[serde(default, alias = "botUsername")]
    pub bot_username: Option<String>,
    #[serde(default, alias = "botIconUrl")]
    pub bot_icon_url: Option<String>,
    /// Web API base URL override.
    #[serde(default, alias = "apiUrl")]
    pub api_url: Option<String>,
}

#[derive(Debug, Clone)]
enum Target {
    Api {
        url: String,
        token: String,
        channel: String,
    },
    Webhook {
        url: String,
    },
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends messages to a Slack channel.
pub struct SlackSender {
    target: Target,
    bot_username: Option<String>,
    bot_icon_url: Option<String>,
    client: reqwest::Client,
}

impl SlackSender {
    pub fn new(config: SlackConfig) -> Result<Self, SendError> {
        let target = match (config.token, config.channel, config.webhook_url) {
            (Some(token), Some(channel), _) => Target::Api {
                url: format!(
                    "{}/chat.postMessage",
                    config
                        .api_url
                        .as_deref()
                        .unwrap_or(SLACK_API_URL)
                        .trim_end_matches('/')
                ),
                token,
                channel,
            },
            (_, _, Some(url)) => Target::Webhook { url },
            _ => {
                return Err(SendError::InvalidConfig(
                    "slack requires 'token' and 'channel', or 'webhook_url'".to_string(),
                ));
            }
        };

        Ok(Self {
            target,
            bot_username: config.bot_username,
            bot_icon_url: config.bot_icon_url,
            client: crate::http_client()?,
        })
    }

    fn payload(&self, message: &Message) -> serde_json::Value {
        let color = match message.kind {
            MessageType::New => COLOR_NEW,
            MessageType::Resolve => COLOR_RESOLVE,
        };

        let mut payload = serde_json::json!({
            "attachments": [{
                "color": color,
                "text": format!("{} \n {}", message.title, message.body),
            }]
        });

        if let Target::Api { channel, .. } = &self.target {
            payload["channel"] = channel.clone().into();
        }
        if let Some(username) = &self.bot_username {
            payload["username"] = username.clone().into();
        }
        if let Some(icon) = &self.bot_icon_url {
            payload["icon_url"] = icon.clone().into();
        }
        payload
    }
}

#[async_trait]
impl Sender for SlackSender {
    fn kind(&self) -> &str {
        "slack"
    }

    async fn send(&self, message: &Message) -> Result<(), SendError> {
        let payload = self.payload(message);

        let request = match &self.target {
            Target::Api { url, token, .. } => self.client.post(url).bearer_auth(token),
            Target::Webhook { url } => self.client.post(url),
        };

        let response = request
            .json(&payload)
            .send()
            .await
            .map_err(|e| SendError::Request(format!("Slack request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        if let Target::Api { channel, .. } = &self.target {
            let reply: ApiResponse = response
                .json()
                .await
                .map_err(|e| SendError::Request(format!("Invalid Slack response: {}", e)))?;
            if !reply.ok {
                return Err(SendError::Rejected {
                    status: status.as_u16(),
                    body: reply.error.unwrap_or_else(|| "unknown error".to_string()),
                });
            }
            debug!("Message sent to Slack channel '{}'", channel);
        } else {
            debug!("Message sent to Slack webhook");
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "slack_tests.rs"]
mod tests;
