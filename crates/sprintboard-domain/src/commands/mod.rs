use sprintboard_core::{SprintboardError, SprintboardResult};

use crate::context::RequestContext;
use crate::events::SprintEvent;
use crate::history::{HistoryAction, HistoryRecord};
use crate::project::{Project, ProjectId};
use crate::sprint::{Sprint, SprintId};
use crate::sprint_report::SprintReport;
use crate::task::{Task, TaskId};
use crate::time_log::TimeLog;

pub mod sprint_commands;
pub mod time_log_commands;

pub use sprint_commands::*;
pub use time_log_commands::*;

/// Trait for domain commands that mutate workspace state.
///
/// A command either completes or returns an error; the caller discards the
/// mutated copy on error, so commands may fail halfway through.
pub trait Command: Send + Sync {
    type Output;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Self::Output>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Mutable view of every aggregate plus the request it runs for.
pub struct CommandContext<'a> {
    pub projects: &'a mut Vec<Project>,
    pub tasks: &'a mut Vec<Task>,
    pub sprints: &'a mut Vec<Sprint>,
    pub reports: &'a mut Vec<SprintReport>,
    pub time_logs: &'a mut Vec<TimeLog>,
    pub history: &'a mut Vec<HistoryRecord>,
    /// Notifications to deliver once the unit of work commits.
    pub events: &'a mut Vec<SprintEvent>,
    pub request: &'a RequestContext,
}

impl CommandContext<'_> {
    pub fn project_index(&self, project_id: ProjectId) -> SprintboardResult<usize> {
        self.projects
            .iter()
            .position(|p| p.id == project_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Project {} not found", project_id)))
    }

    /// Index of a sprint that belongs to `project_id`.
    pub fn sprint_index(&self, project_id: ProjectId, sprint_id: SprintId) -> SprintboardResult<usize> {
        self.sprints
            .iter()
            .position(|s| s.id == sprint_id && s.project_id == project_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Sprint {} not found", sprint_id)))
    }

    pub fn task_index(&self, project_id: ProjectId, task_id: TaskId) -> SprintboardResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id && t.project_id == project_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Task {} not found", task_id)))
    }

    pub fn report_index(&self, sprint_id: SprintId) -> SprintboardResult<usize> {
        self.reports
            .iter()
            .position(|r| r.sprint_id == sprint_id)
            .ok_or_else(|| {
                SprintboardError::NotFound(format!("Report for sprint {} not found", sprint_id))
            })
    }

    /// Recompute the rollups of the sprint at `index` from current task figures.
    pub fn refresh_sprint_totals(&mut self, index: usize) {
        let tasks: &[Task] = &self.tasks[..];
        if let Some(sprint) = self.sprints.get_mut(index) {
            sprint.recompute_totals(tasks);
            sprint.updated_at = self.request.now;
        }
    }

    pub fn record(&mut self, action: HistoryAction, task_id: TaskId, sprint_id: Option<SprintId>) {
        self.history.push(HistoryRecord::new(
            action,
            task_id,
            sprint_id,
            self.request.actor_id,
            self.request.now,
        ));
    }
}
