//! File system incident storage.
//!
//! Each open incident is a pretty-printed JSON document named after its
//! encoded check name. Writes go through a temporary file and a rename.
//!
//! File names keep ASCII letters, digits and `-`; every other byte becomes
//! `_XX` (upper-case hex), so distinct check names never share a file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use vigil_protocols::{Incident, Storage, StorageError};

use crate::backoff::Backoff;

/// Directory-backed incident storage.
pub struct FileStorage {
    root: PathBuf,
    ready: AtomicBool,
    writes: Mutex<()>,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ready: AtomicBool::new(false),
            writes: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn incident_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::encode_name(name)))
    }

    fn encode_name(name: &str) -> String {
        let mut encoded = String::with_capacity(name.len());
        for byte in name.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                encoded.push(byte as char);
            } else {
                encoded.push_str(&format!("_{:02X}", byte));
            }
        }
        encoded
    }

    /// Read the incident stored for `name`, ignoring a document that belongs
    /// to another check.
    async fn read_owned(&self, name: &str) -> Result<Option<Incident>, StorageError> {
        let path = self.incident_path(name);
        match Self::read(&path).await? {
            Some(incident) if incident.name() != name => {
                warn!(
                    "Incident file {:?} belongs to '{}', not '{}'",
                    path,
                    incident.name(),
                    name
                );
                Ok(None)
            }
            found => Ok(found),
        }
    }

    fn ensure_ready(&self) -> Result<(), StorageError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    async fn write(&self, path: &Path, incident: &Incident) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(incident)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, content).await?;
        fs::rename(&staging, path).await?;
        Ok(())
    }

    async fn read(path: &Path) -> Result<Option<Incident>, StorageError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn init(&self) -> Result<(), StorageError> {
        let mut backoff = Backoff::default();
        loop {
            match fs::create_dir_all(&self.root).await {
                Ok(()) => break,
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Failed to prepare incident directory {:?}: {}, retrying in {:?}",
                        self.root, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        self.ready.store(true, Ordering::Release);
        info!("File storage initialized at {:?}", self.root);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Incident>, StorageError> {
        self.ensure_ready()?;
        self.read_owned(name).await
    }

    async fn get_all(&self) -> Result<Vec<Incident>, StorageError> {
        self.ensure_ready()?;

        let mut incidents = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            match Self::read(&path).await {
                Ok(Some(incident)) => incidents.push(incident),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable incident file {:?}: {}", path, e),
            }
        }

        incidents.sort_by(|a, b| a.name().cmp(b.name()));
        debug!("Loaded {} incidents from {:?}", incidents.len(), self.root);
        Ok(incidents)
    }

    async fn set(&self, incident: &Incident) -> Result<(), StorageError> {
        self.ensure_ready()?;
        let _guard = self.writes.lock().await;

        let path = self.incident_path(incident.name());
        if fs::try_exists(&path).await? {
            return Err(StorageError::DuplicateKey(incident.name().to_string()));
        }

        self.write(&path, incident).await?;
        debug!("Stored incident '{}' at {:?}", incident.id, path);
        Ok(())
    }

    async fn update(&self, name: &str, incident: &Incident) -> Result<(), StorageError> {
        self.ensure_ready()?;
        let _guard = self.writes.lock().await;

        if self.read_owned(name).await?.is_none() {
            debug!("No incident stored for '{}', update ignored", name);
            return Ok(());
        }

        self.write(&self.incident_path(name), incident).await
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        self.ensure_ready()?;
        let _guard = self.writes.lock().await;

        if self.read_owned(name).await?.is_none() {
            return Ok(());
        }

        match fs::remove_file(self.incident_path(name)).await {
            Ok(()) => {
                debug!("Deleted incident for '{}'", name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
