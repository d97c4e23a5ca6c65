//! Append-only task history records.
//!
//! Every admission, removal, column move and time log writes one record in
//! the same unit of work as the change it describes. The engine never reads
//! these back to make decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;

use crate::project::{StatusId, UserId};
use crate::sprint::SprintId;
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HistoryAction {
    AddedToSprint,
    RemovedFromSprint,
    MovedColumn {
        from_status: StatusId,
        to_status: StatusId,
    },
    TimeLogged {
        seconds: Seconds,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    pub action: HistoryAction,
    pub task_id: TaskId,
    #[serde(default)]
    pub sprint_id: Option<SprintId>,
    pub actor_id: UserId,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        action: HistoryAction,
        task_id: TaskId,
        sprint_id: Option<SprintId>,
        actor_id: UserId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action,
            task_id,
            sprint_id,
            actor_id,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_record_serializes_flat_action_tag() {
        let record = HistoryRecord::new(
            HistoryAction::TimeLogged { seconds: 3_600 },
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            Utc::now(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["action"], "time_logged");
        assert_eq!(value["seconds"], 3_600);

        let restored: HistoryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(restored.action, record.action);
    }
}
