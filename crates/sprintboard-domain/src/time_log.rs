use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;
use uuid::Uuid;

use crate::project::UserId;
use crate::sprint::SprintId;
use crate::task::TaskId;

pub type TimeLogId = Uuid;

/// An immutable time-log row. Only ever aggregated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLog {
    pub id: TimeLogId,
    pub created_by: UserId,
    pub task_id: TaskId,
    #[serde(default)]
    pub sprint_id: Option<SprintId>,
    pub logged_time: Seconds,
    pub remaining_time: Seconds,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub description: String,
    #[serde(default)]
    pub is_period: bool,
    pub created_at: DateTime<Utc>,
}

impl TimeLog {
    /// Inclusive calendar range covered by this log.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let start = self.start_date.date_naive();
        let end = match (self.is_period, self.end_date) {
            (true, Some(end)) => end.date_naive(),
            _ => start,
        };
        (start, end)
    }

    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        let (start, end) = self.date_range();
        start <= to && end >= from
    }
}

/// A time-log submission before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTimeLog {
    pub task_id: TaskId,
    pub logged_time: Seconds,
    #[serde(default)]
    pub remaining_time: Option<Seconds>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_period: bool,
}
