//! Notification delivery errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Remote rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid sender configuration: {0}")]
    InvalidConfig(String),
}
