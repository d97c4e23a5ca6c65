use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot, FORMAT_VERSION};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use sprintboard_core::{SprintboardError, SprintboardResult};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// JSON file-based persistence store.
///
/// Saves hold an exclusive lock on a `<file>.lock` sidecar for the whole
/// read, compare and rename sequence, so stores in other processes (or other
/// instances in this one) pointing at the same file never commit on top of
/// the same revision.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    instance_id: Uuid,
}

/// On-disk file layout
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self {
            path,
            lock_path: PathBuf::from(lock_path),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// Block until this store owns the sidecar lock. The lock is released
    /// when the returned file is dropped.
    async fn acquire_write_lock(&self) -> SprintboardResult<File> {
        let lock_path = self.lock_path.clone();
        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(|e| SprintboardError::Internal(format!("Lock task failed: {}", e)))??;

        tracing::trace!("Acquired write lock {}", self.lock_path.display());
        Ok(file)
    }

    async fn read_envelope(&self) -> SprintboardResult<Option<JsonEnvelope>> {
        let Some(bytes) = AtomicWriter::read_optional(&self.path).await? else {
            return Ok(None);
        };
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| SprintboardError::Serialization(e.to_string()))?;
        if envelope.version != FORMAT_VERSION {
            return Err(SprintboardError::Serialization(format!(
                "Unsupported format version: {}",
                envelope.version
            )));
        }
        Ok(Some(envelope))
    }
}

#[async_trait::async_trait]
impl PersistenceStore for JsonFileStore {
    async fn load(&self) -> SprintboardResult<Option<StoreSnapshot>> {
        let Some(envelope) = self.read_envelope().await? else {
            tracing::debug!("No workspace file at {}", self.path.display());
            return Ok(None);
        };
        let data = serde_json::to_vec(&envelope.data)
            .map_err(|e| SprintboardError::Serialization(e.to_string()))?;

        tracing::debug!(
            "Loaded revision {} from {}",
            envelope.metadata.revision,
            self.path.display()
        );
        Ok(Some(StoreSnapshot {
            data,
            metadata: envelope.metadata,
        }))
    }

    async fn save(
        &self,
        data: Vec<u8>,
        expected_revision: u64,
    ) -> SprintboardResult<PersistenceMetadata> {
        let _lock = self.acquire_write_lock().await?;

        let found = self
            .read_envelope()
            .await?
            .map(|e| e.metadata.revision)
            .unwrap_or(0);
        if found != expected_revision {
            return Err(SprintboardError::ConcurrentModification {
                expected: expected_revision,
                found,
            });
        }

        let data_value: serde_json::Value = serde_json::from_slice(&data)
            .map_err(|e| SprintboardError::Serialization(e.to_string()))?;
        let metadata = PersistenceMetadata::new(self.instance_id, expected_revision + 1);
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: metadata.clone(),
            data: data_value,
        };
        let json_bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| SprintboardError::Serialization(e.to_string()))?;

        AtomicWriter::write_atomic(&self.path, &json_bytes).await?;

        tracing::debug!(
            "Saved revision {} ({} bytes) to {}",
            metadata.revision,
            json_bytes.len(),
            self.path.display()
        );
        Ok(metadata)
    }
}
