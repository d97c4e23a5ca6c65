use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;
use uuid::Uuid;

use crate::project::{ProjectId, StatusId, UserId, WorkingDay};
use crate::sprint::{EntryState, SprintId};
use crate::task::TaskId;
use crate::time_log::TimeLogId;

pub type SprintReportId = Uuid;

/// One ledger row: a time log a member booked against a task in the sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTaskLog {
    pub time_log_id: TimeLogId,
    pub task_id: TaskId,
    pub logged_time: Seconds,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMember {
    pub user_id: UserId,
    pub working_capacity: Seconds,
    pub working_capacity_per_day: Seconds,
    pub working_days: Vec<WorkingDay>,
    #[serde(default)]
    pub total_logged_time: Seconds,
    /// Share of the sprint's logged time, set when the report is finalized.
    #[serde(default)]
    pub productivity: f64,
    #[serde(default)]
    pub task_logs: Vec<ReportTaskLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTask {
    pub task_id: TaskId,
    pub title: String,
    #[serde(default)]
    pub type_id: Option<Uuid>,
    #[serde(default)]
    pub priority_id: Option<Uuid>,
    pub status_id: StatusId,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    pub estimated_time: Seconds,
    #[serde(default)]
    pub total_logged_time: Seconds,
    #[serde(default)]
    pub remaining_time: Seconds,
    pub state: EntryState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub status_id: StatusId,
    pub task_count: usize,
    pub estimated_time: Seconds,
    pub logged_time: Seconds,
    pub remaining_time: Seconds,
}

/// Denormalized per-sprint snapshot, patched while the sprint runs and read
/// as history once it is finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintReport {
    pub id: SprintReportId,
    pub sprint_id: SprintId,
    pub project_id: ProjectId,
    #[serde(default)]
    pub report_members: Vec<ReportMember>,
    #[serde(default)]
    pub report_tasks: Vec<ReportTask>,
    #[serde(default)]
    pub status_summary: Vec<StatusSummary>,
    #[serde(default)]
    pub total_logged_time: Seconds,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SprintReport {
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    pub fn member(&self, user_id: UserId) -> Option<&ReportMember> {
        self.report_members.iter().find(|m| m.user_id == user_id)
    }

    pub fn member_mut(&mut self, user_id: UserId) -> Option<&mut ReportMember> {
        self.report_members.iter_mut().find(|m| m.user_id == user_id)
    }

    pub fn task(&self, task_id: TaskId) -> Option<&ReportTask> {
        self.report_tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut ReportTask> {
        self.report_tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    pub fn active_tasks(&self) -> impl Iterator<Item = &ReportTask> {
        self.report_tasks.iter().filter(|t| t.state.is_active())
    }
}
