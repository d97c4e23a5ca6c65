use crate::traits::{PersistenceMetadata, PersistenceStore, StoreSnapshot};
use parking_lot::Mutex;
use sprintboard_core::{SprintboardError, SprintboardResult};
use uuid::Uuid;

/// In-process store for embedding the engine and for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    instance_id: Uuid,
    current: Mutex<Option<StoreSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            current: Mutex::new(None),
        }
    }

    /// Current revision, 0 when empty
    pub fn revision(&self) -> u64 {
        self.current
            .lock()
            .as_ref()
            .map(|s| s.metadata.revision)
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl PersistenceStore for MemoryStore {
    async fn load(&self) -> SprintboardResult<Option<StoreSnapshot>> {
        Ok(self.current.lock().clone())
    }

    async fn save(
        &self,
        data: Vec<u8>,
        expected_revision: u64,
    ) -> SprintboardResult<PersistenceMetadata> {
        let mut current = self.current.lock();
        let found = current.as_ref().map(|s| s.metadata.revision).unwrap_or(0);
        if found != expected_revision {
            return Err(SprintboardError::ConcurrentModification {
                expected: expected_revision,
                found,
            });
        }

        let metadata = PersistenceMetadata::new(self.instance_id, found + 1);
        *current = Some(StoreSnapshot {
            data,
            metadata: metadata.clone(),
        });
        Ok(metadata)
    }
}
