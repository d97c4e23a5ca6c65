use serde::{Deserialize, Serialize};

use crate::project::{ProjectId, UserId};
use crate::sprint::SprintId;

/// Notification raised by a committed lifecycle change. Collected during the
/// unit of work and delivered only after it commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SprintEvent {
    Published {
        project_id: ProjectId,
        sprint_id: SprintId,
        sprint_name: String,
        recipients: Vec<UserId>,
        locale: String,
    },
    Closed {
        project_id: ProjectId,
        sprint_id: SprintId,
        sprint_name: String,
        next_sprint_id: Option<SprintId>,
        recipients: Vec<UserId>,
        locale: String,
    },
}

impl SprintEvent {
    pub fn sprint_id(&self) -> SprintId {
        match self {
            SprintEvent::Published { sprint_id, .. } | SprintEvent::Closed { sprint_id, .. } => {
                *sprint_id
            }
        }
    }

    pub fn recipients(&self) -> &[UserId] {
        match self {
            SprintEvent::Published { recipients, .. } | SprintEvent::Closed { recipients, .. } => {
                recipients
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SprintEvent::Published { .. } => "sprint_published",
            SprintEvent::Closed { .. } => "sprint_closed",
        }
    }

    /// Rendered notification text.
    pub fn message(&self) -> String {
        match self {
            SprintEvent::Published { sprint_name, .. } => {
                format!("Sprint '{}' has started", sprint_name)
            }
            SprintEvent::Closed {
                sprint_name,
                next_sprint_id: Some(_),
                ..
            } => format!(
                "Sprint '{}' was closed and its unfinished tasks moved to a new sprint",
                sprint_name
            ),
            SprintEvent::Closed { sprint_name, .. } => {
                format!("Sprint '{}' was closed", sprint_name)
            }
        }
    }
}
