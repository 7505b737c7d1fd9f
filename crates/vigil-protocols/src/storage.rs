//! Incident storage contract.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::incident::Incident;

/// Persistence for incidents, keyed by check name.
///
/// Backends own their connection and concurrency discipline. Callers bound
/// each call with their own deadline.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Establish the backend. Retries until it succeeds.
    async fn init(&self) -> Result<(), StorageError>;

    /// Fetch the incident for a check. Absence is `Ok(None)`.
    async fn get(&self, name: &str) -> Result<Option<Incident>, StorageError>;

    /// Fetch every stored incident.
    async fn get_all(&self) -> Result<Vec<Incident>, StorageError>;

    /// Insert a new incident. Fails if one already exists for the name.
    async fn set(&self, incident: &Incident) -> Result<(), StorageError>;

    /// Replace the incident stored under `name`. A missing target is a no-op.
    async fn update(&self, name: &str, incident: &Incident) -> Result<(), StorageError>;

    /// Remove the incident stored under `name`.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;
}
