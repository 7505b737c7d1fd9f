//! In-memory incident storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vigil_protocols::{Incident, Storage, StorageError};

/// Process-local incident storage.
pub struct MemoryStorage {
    incidents: RwLock<HashMap<String, Incident>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            incidents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Incident>, StorageError> {
        Ok(self.incidents.read().await.get(name).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Incident>, StorageError> {
        let incidents = self.incidents.read().await;
        let mut all: Vec<_> = incidents.values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all)
    }

    async fn set(&self, incident: &Incident) -> Result<(), StorageError> {
        let mut incidents = self.incidents.write().await;
        if incidents.contains_key(incident.name()) {
            return Err(StorageError::DuplicateKey(incident.name().to_string()));
        }
        incidents.insert(incident.name().to_string(), incident.clone());
        Ok(())
    }

    async fn update(&self, name: &str, incident: &Incident) -> Result<(), StorageError> {
        if let Some(slot) = self.incidents.write().await.get_mut(name) {
            *slot = incident.clone();
        }
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.incidents.write().await.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_protocols::{Check, CheckDefinition};

    fn incident(name: &str) -> Incident {
        let mut check = Check::new(CheckDefinition::new(name, "check", 5), Vec::new());
        check.state.status = 2;
        check.state.output = "down".to_string();
        Incident::open(&mut check)
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let storage = MemoryStorage::new();
        storage.init().await.unwrap();

        let inc = incident("web");
        storage.set(&inc).await.unwrap();

        let loaded = storage.get("web").await.unwrap().unwrap();
        assert_eq!(loaded.id, inc.id);

        storage.delete("web").await.unwrap();
        assert!(storage.get("web").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_duplicate_rejected() {
        let storage = MemoryStorage::new();
        storage.set(&incident("web")).await.unwrap();

        let err = storage.set(&incident("web")).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateKey(name) if name == "web"));
    }

    #[tokio::test]
    async fn test_update_replaces() {
        let storage = MemoryStorage::new();
        let mut inc = incident("web");
        storage.set(&inc).await.unwrap();

        inc.record_failure("still down");
        storage.update("web", &inc).await.unwrap();

        let loaded = storage.get("web").await.unwrap().unwrap();
        assert_eq!(loaded.state.attempts, 2);
        assert_eq!(loaded.state.output, "still down");
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let storage = MemoryStorage::new();
        storage.update("ghost", &incident("ghost")).await.unwrap();
        assert!(storage.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.delete("ghost").await.is_ok());
    }

    #[tokio::test]
    async fn test_get_all_sorted() {
        let storage = MemoryStorage::new();
        for name in ["zeta", "alpha", "mid"] {
            storage.set(&incident(name)).await.unwrap();
        }

        let names: Vec<_> = storage
            .get_all()
            .await
            .unwrap()
            .iter()
            .map(|i| i.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
