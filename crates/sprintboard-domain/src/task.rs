use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;
use uuid::Uuid;

use crate::progress::compute_progress;
use crate::project::{ProjectId, StatusId, UserId};
use crate::sprint::SprintId;

pub type TaskId = Uuid;

/// A task owned by the task collaborator. The engine writes the time-derived
/// fields and the sprint pointer; everything else is read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub type_id: Option<Uuid>,
    #[serde(default)]
    pub priority_id: Option<Uuid>,
    pub status_id: StatusId,
    #[serde(default)]
    pub estimated_time: Seconds,
    #[serde(default)]
    pub remaining_time: Seconds,
    #[serde(default)]
    pub total_logged_time: Seconds,
    #[serde(default)]
    pub over_logged_time: Seconds,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub over_progress: f64,
    #[serde(default)]
    pub sprint_id: Option<SprintId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(project_id: ProjectId, title: impl Into<String>, status_id: StatusId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: title.into(),
            assignee_id: None,
            type_id: None,
            priority_id: None,
            status_id,
            estimated_time: 0,
            remaining_time: 0,
            total_logged_time: 0,
            over_logged_time: 0,
            progress: 0.0,
            over_progress: 0.0,
            sprint_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_assignee(&mut self, assignee_id: Option<UserId>) {
        self.assignee_id = assignee_id;
        self.updated_at = Utc::now();
    }

    /// Change the estimate and re-derive remaining time and progress from
    /// what has been logged so far.
    pub fn set_estimate(&mut self, estimated_time: Seconds) {
        self.estimated_time = estimated_time;
        self.remaining_time = estimated_time.saturating_sub(self.total_logged_time);
        self.refresh_progress();
        self.updated_at = Utc::now();
    }

    pub fn assign_to_sprint(&mut self, sprint_id: SprintId, now: DateTime<Utc>) {
        self.sprint_id = Some(sprint_id);
        self.updated_at = now;
    }

    pub fn return_to_backlog(&mut self, now: DateTime<Utc>) {
        self.sprint_id = None;
        self.updated_at = now;
    }

    pub fn update_status(&mut self, status_id: StatusId, now: DateTime<Utc>) {
        self.status_id = status_id;
        self.updated_at = now;
    }

    /// Add a logged duration. `reported_remaining` is the submitter's own
    /// remaining-time figure; it is forced to zero once the estimate is used up.
    pub fn apply_logged_time(
        &mut self,
        logged: Seconds,
        reported_remaining: Seconds,
        now: DateTime<Utc>,
    ) {
        self.total_logged_time += logged;
        self.refresh_progress();
        self.remaining_time = if self.total_logged_time >= self.estimated_time {
            0
        } else {
            reported_remaining
        };
        self.updated_at = now;
    }

    fn refresh_progress(&mut self) {
        let figures = compute_progress(self.total_logged_time, self.estimated_time);
        self.progress = figures.progress;
        self.over_progress = figures.over_progress;
        self.over_logged_time = figures.over_logged_time;
    }
}
