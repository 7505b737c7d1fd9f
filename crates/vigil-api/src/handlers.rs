//! Route handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vigil_protocols::{Incident, Message, MessageType, StorageError};

use crate::error::ApiError;
use crate::state::AppState;

/// Generic `{"message": ..}` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IncidentsResponse {
    pub incidents: Vec<Incident>,
}

/// Handler entry in the stats response. Credentials are never included.
#[derive(Debug, Serialize, Deserialize)]
pub struct HandlerSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub handlers: BTreeMap<String, HandlerSummary>,
    pub uptime_seconds: u64,
}

/// Body of a manual send.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub title: String,
    pub body: String,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Vigil API"))
}

pub async fn list_incidents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IncidentsResponse>, ApiError> {
    let deadline = state.storage_deadline();
    let incidents = match tokio::time::timeout(deadline, state.storage.get_all()).await {
        Ok(result) => result,
        Err(_) => Err(StorageError::Timeout(deadline)),
    }
    .map_err(|e| ApiError::Storage(e.to_string()))?;

    Ok(Json(IncidentsResponse { incidents }))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let handlers = state
        .registry
        .list()
        .into_iter()
        .map(|handler| {
            let summary = HandlerSummary {
                name: handler.name().to_string(),
                kind: handler.kind().to_string(),
            };
            (summary.name.clone(), summary)
        })
        .collect();

    Json(StatsResponse {
        handlers,
        uptime_seconds: state.uptime().as_secs(),
    })
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let handler = state
        .registry
        .get(&name)
        .map_err(|_| ApiError::HandlerNotFound(name.clone()))?;

    let message = Message::new(request.title, request.body, MessageType::New);
    if let Err(e) = handler.send(&message).await {
        warn!(handler = %name, error = %e, "Manual send failed");
        return Err(ApiError::SendFailed(e.to_string()));
    }

    info!(handler = %name, "Manual message sent");
    Ok(Json(MessageResponse::new("message sent")))
}
