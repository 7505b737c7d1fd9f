//! # Vigil Notify
//!
//! [`Sender`](vigil_protocols::Sender) implementations and the factory that
//! builds them from handler definitions.
//!
//! | type       | sender              |
//! |------------|---------------------|
//! | `console`  | [`ConsoleSender`]   |
//! | `slack`    | [`SlackSender`]     |
//! | `sendgrid` | [`SendGridSender`]  |

pub mod console;
pub mod factory;
pub mod sendgrid;
pub mod slack;

pub use console::ConsoleSender;
pub use factory::{build_sender, SENDER_KINDS};
pub use sendgrid::{SendGridConfig, SendGridSender};
pub use slack::{SlackConfig, SlackSender};

use std::time::Duration;

use vigil_protocols::SendError;

/// Request timeout for HTTP senders.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client, SendError> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| SendError::InvalidConfig(format!("HTTP client: {}", e)))
}
