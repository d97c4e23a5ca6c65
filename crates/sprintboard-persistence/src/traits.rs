use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::SprintboardResult;
use uuid::Uuid;

/// Version of the on-disk envelope format.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
    /// Incremented by every successful save; 0 means nothing was saved yet.
    pub revision: u64,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid, revision: u64) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
            revision,
        }
    }
}

/// Point-in-time snapshot of all persisted data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Raw JSON bytes of the workspace
    pub data: Vec<u8>,
    pub metadata: PersistenceMetadata,
}

/// Trait for abstract storage operations.
///
/// Saves are optimistic: `save` succeeds only when the stored revision still
/// equals `expected_revision`, and fails with
/// `SprintboardError::ConcurrentModification` otherwise.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Load the latest snapshot, or `None` when nothing was saved yet
    async fn load(&self) -> SprintboardResult<Option<StoreSnapshot>>;

    /// Save `data` on top of `expected_revision`, returning the new metadata
    async fn save(&self, data: Vec<u8>, expected_revision: u64)
        -> SprintboardResult<PersistenceMetadata>;
}

/// Trait for serialization/deserialization strategies
pub trait Serializer<T: Send + Sync>: Send + Sync {
    fn serialize(&self, data: &T) -> SprintboardResult<Vec<u8>>;

    fn deserialize(&self, bytes: &[u8]) -> SprintboardResult<T>;
}
