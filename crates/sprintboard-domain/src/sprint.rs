use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::{Rejection, RejectionCode, Seconds};
use uuid::Uuid;

use crate::progress::compute_progress;
use crate::project::{ProjectId, ProjectMember, StatusId, UserId, WorkingDay};
use crate::task::{Task, TaskId};

pub type SprintId = Uuid;
pub type SprintColumnId = Uuid;

/// Published-or-later states. A draft sprint has no status at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SprintStatus {
    InProgress,
    Closed,
    Completed,
}

/// Column entries and report rows are never deleted, only marked removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    Active,
    Removed { by: UserId, at: DateTime<Utc> },
}

impl EntryState {
    pub fn is_active(&self) -> bool {
        matches!(self, EntryState::Active)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintColumnTask {
    pub task_id: TaskId,
    pub added_by: UserId,
    pub added_at: DateTime<Utc>,
    pub state: EntryState,
    /// Time logged against the task while it sat in this sprint.
    #[serde(default)]
    pub total_logged_time: Seconds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintColumn {
    pub id: SprintColumnId,
    pub status_id: StatusId,
    #[serde(default)]
    pub tasks: Vec<SprintColumnTask>,
    #[serde(default)]
    pub total_estimation: Seconds,
}

impl SprintColumn {
    pub fn new(status_id: StatusId) -> Self {
        Self {
            id: Uuid::new_v4(),
            status_id,
            tasks: Vec::new(),
            total_estimation: 0,
        }
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &SprintColumnTask> {
        self.tasks.iter().filter(|t| t.state.is_active())
    }

    pub fn active_entry_index(&self, task_id: TaskId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|t| t.task_id == task_id && t.state.is_active())
    }

    pub fn has_active_tasks(&self) -> bool {
        self.active_tasks().next().is_some()
    }

    pub fn push_entry(
        &mut self,
        task_id: TaskId,
        estimate: Seconds,
        added_by: UserId,
        added_at: DateTime<Utc>,
        total_logged_time: Seconds,
    ) {
        self.tasks.push(SprintColumnTask {
            task_id,
            added_by,
            added_at,
            state: EntryState::Active,
            total_logged_time,
        });
        self.total_estimation += estimate;
    }

    /// Mark the entry removed and drop its estimate from the column total.
    pub fn soft_remove(&mut self, index: usize, estimate: Seconds, by: UserId, at: DateTime<Utc>) {
        if let Some(entry) = self.tasks.get_mut(index) {
            entry.state = EntryState::Removed { by, at };
            self.total_estimation = self.total_estimation.saturating_sub(estimate);
        }
    }

    /// Physically take the entry out of this column, for relocation.
    pub fn take_entry(&mut self, index: usize, estimate: Seconds) -> Option<SprintColumnTask> {
        if index >= self.tasks.len() {
            return None;
        }
        self.total_estimation = self.total_estimation.saturating_sub(estimate);
        Some(self.tasks.remove(index))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintMemberCapacity {
    pub user_id: UserId,
    pub working_capacity: Seconds,
    pub working_capacity_per_day: Seconds,
    pub working_days: Vec<WorkingDay>,
}

impl From<&ProjectMember> for SprintMemberCapacity {
    fn from(member: &ProjectMember) -> Self {
        Self {
            user_id: member.user_id,
            working_capacity: member.working_capacity,
            working_capacity_per_day: member.working_capacity_per_day,
            working_days: member.working_days.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub goal: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: Option<SprintStatus>,
    #[serde(default)]
    pub status_updated_by: Option<UserId>,
    #[serde(default)]
    pub status_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub columns: Vec<SprintColumn>,
    #[serde(default)]
    pub members: Vec<SprintMemberCapacity>,
    #[serde(default)]
    pub total_capacity: Seconds,
    #[serde(default)]
    pub total_estimation: Seconds,
    #[serde(default)]
    pub total_logged_time: Seconds,
    #[serde(default)]
    pub total_over_logged_time: Seconds,
    #[serde(default)]
    pub total_remaining_capacity: i64,
    #[serde(default)]
    pub total_remaining_time: Seconds,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub over_progress: f64,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Case- and surrounding-whitespace-insensitive sprint name key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Sprint {
    pub fn new(
        project_id: ProjectId,
        name: String,
        goal: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name,
            goal,
            start_date,
            end_date,
            status: None,
            status_updated_by: None,
            status_updated_at: None,
            columns: Vec::new(),
            members: Vec::new(),
            total_capacity: 0,
            total_estimation: 0,
            total_logged_time: 0,
            total_over_logged_time: 0,
            total_remaining_capacity: 0,
            total_remaining_time: 0,
            progress: 0.0,
            over_progress: 0.0,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            Some(SprintStatus::Closed) | Some(SprintStatus::Completed)
        )
    }

    pub fn set_status(&mut self, status: SprintStatus, by: UserId, at: DateTime<Utc>) {
        self.status = Some(status);
        self.status_updated_by = Some(by);
        self.status_updated_at = Some(at);
        self.updated_at = at;
    }

    /// Guard for operations that only make sense before publishing.
    pub fn ensure_draft(&self) -> Result<(), Rejection> {
        match self.status {
            None => Ok(()),
            Some(SprintStatus::InProgress) => Err(Rejection::new(
                RejectionCode::AlreadyPublished,
                Some(self.id),
                format!("Sprint '{}' is already published", self.name),
            )),
            Some(_) => Err(self.closed_rejection()),
        }
    }

    /// Guard for any mutation of a sprint's contents.
    pub fn ensure_open(&self) -> Result<(), Rejection> {
        if self.is_finished() {
            return Err(self.closed_rejection());
        }
        Ok(())
    }

    /// Whether new tasks may still be admitted on `today`.
    pub fn ensure_accepts_new_work(&self, today: NaiveDate) -> Result<(), Rejection> {
        self.ensure_open()?;
        if self.status == Some(SprintStatus::InProgress) && self.end_date < today {
            return Err(Rejection::new(
                RejectionCode::SprintEnded,
                Some(self.id),
                format!("Sprint '{}' ended on {}", self.name, self.end_date),
            ));
        }
        Ok(())
    }

    fn closed_rejection(&self) -> Rejection {
        Rejection::new(
            RejectionCode::AlreadyClosed,
            Some(self.id),
            format!("Sprint '{}' is already closed", self.name),
        )
    }

    pub fn active_entries(&self) -> impl Iterator<Item = &SprintColumnTask> {
        self.columns.iter().flat_map(|c| c.active_tasks())
    }

    pub fn active_task_ids(&self) -> Vec<TaskId> {
        self.active_entries().map(|e| e.task_id).collect()
    }

    pub fn contains_task(&self, task_id: TaskId) -> bool {
        self.active_entries().any(|e| e.task_id == task_id)
    }

    pub fn has_active_tasks(&self) -> bool {
        self.columns.iter().any(|c| c.has_active_tasks())
    }

    pub fn member(&self, user_id: UserId) -> Option<&SprintMemberCapacity> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn member_mut(&mut self, user_id: UserId) -> Option<&mut SprintMemberCapacity> {
        self.members.iter_mut().find(|m| m.user_id == user_id)
    }

    pub fn recompute_capacity(&mut self) {
        self.total_capacity = self.members.iter().map(|m| m.working_capacity).sum();
        self.total_remaining_capacity = self.total_capacity as i64 - self.total_estimation as i64;
    }

    /// Recompute every rollup from column totals, cached entry logged time and
    /// the current remaining time of the tasks in `tasks`.
    pub fn recompute_totals(&mut self, tasks: &[Task]) {
        self.total_estimation = self.columns.iter().map(|c| c.total_estimation).sum();
        self.total_remaining_capacity = self.total_capacity as i64 - self.total_estimation as i64;

        let mut logged = 0;
        let mut remaining = 0;
        for entry in self.columns.iter().flat_map(|c| c.active_tasks()) {
            logged += entry.total_logged_time;
            if let Some(task) = tasks.iter().find(|t| t.id == entry.task_id) {
                remaining += task.remaining_time;
            }
        }
        self.total_logged_time = logged;
        self.total_remaining_time = remaining;

        let figures = compute_progress(self.total_logged_time, self.total_estimation);
        self.progress = figures.progress;
        self.over_progress = figures.over_progress;
        self.total_over_logged_time = figures.over_logged_time;
    }

    pub fn update(&mut self, updates: SprintUpdate, now: DateTime<Utc>) {
        if let Some(name) = updates.name {
            self.name = name.trim().to_string();
        }
        if let Some(goal) = updates.goal {
            self.goal = goal.trim().to_string();
        }
        if let Some(start_date) = updates.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = updates.end_date {
            self.end_date = end_date;
        }
        self.updated_at = now;
    }
}

/// Sprint creation payload. Dates are optional here so that a missing date
/// is reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSprint {
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Partial update for a draft sprint
#[derive(Debug, Clone, Default)]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
