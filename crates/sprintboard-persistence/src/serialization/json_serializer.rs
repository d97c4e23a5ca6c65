use crate::traits::Serializer;
use sprintboard_core::{SprintboardError, SprintboardResult};

/// JSON serializer for workspace snapshots
pub struct JsonSerializer;

impl<T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync> Serializer<T>
    for JsonSerializer
{
    fn serialize(&self, data: &T) -> SprintboardResult<Vec<u8>> {
        serde_json::to_vec(data).map_err(|e| SprintboardError::Serialization(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> SprintboardResult<T> {
        serde_json::from_slice(bytes).map_err(|e| SprintboardError::Serialization(e.to_string()))
    }
}
