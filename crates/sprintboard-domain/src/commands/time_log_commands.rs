use serde::{Deserialize, Serialize};
use sprintboard_core::{Rejection, RejectionCode, SprintboardError, SprintboardResult};
use uuid::Uuid;

use super::{Command, CommandContext};
use crate::board_sync;
use crate::history::HistoryAction;
use crate::project::ProjectId;
use crate::report;
use crate::task::Task;
use crate::time_log::{NewTimeLog, TimeLog};
use crate::time_tracking;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLogOutcome {
    pub time_log: TimeLog,
    pub task: Task,
}

/// Log time against a task on behalf of the request's actor
pub struct AddTimeLog {
    pub project_id: ProjectId,
    pub submission: NewTimeLog,
}

impl Command for AddTimeLog {
    type Output = TimeLogOutcome;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<TimeLogOutcome> {
        let project_idx = context.project_index(self.project_id)?;
        let task_idx = context.task_index(self.project_id, self.submission.task_id)?;
        let actor = context.request.actor_id;
        let now = context.request.now;

        let (window, remaining) = time_tracking::validate_submission(
            &self.submission,
            &context.tasks[task_idx],
            actor,
            now,
        )?;

        let sprint_id = context.tasks[task_idx].sprint_id;
        let sprint_idx = match sprint_id {
            Some(id) => Some(context.sprint_index(self.project_id, id)?),
            None => None,
        };

        // daily cap comes from the sprint roster when the task is in a sprint
        let per_day = match sprint_idx {
            Some(index) => {
                let sprint = &context.sprints[index];
                sprint.ensure_open()?;
                sprint
                    .member(actor)
                    .map(|m| m.working_capacity_per_day)
                    .ok_or_else(|| {
                        Rejection::new(
                            RejectionCode::MemberNotInSprint,
                            Some(actor),
                            format!("User {} is not a member of sprint '{}'", actor, sprint.name),
                        )
                    })?
            }
            None => context.projects[project_idx]
                .member(actor)
                .map(|m| m.working_capacity_per_day)
                .ok_or_else(|| {
                    SprintboardError::NotFound(format!("User {} is not a project member", actor))
                })?,
        };

        let member_logs: Vec<&TimeLog> = context
            .time_logs
            .iter()
            .filter(|log| log.created_by == actor)
            .collect();
        time_tracking::check_logging_limit(
            &member_logs,
            actor,
            &window,
            self.submission.logged_time,
            per_day,
        )?;

        let log = TimeLog {
            id: Uuid::new_v4(),
            created_by: actor,
            task_id: self.submission.task_id,
            sprint_id,
            logged_time: self.submission.logged_time,
            remaining_time: remaining,
            start_date: window.start,
            end_date: window.end,
            description: self.submission.description.trim().to_string(),
            is_period: self.submission.is_period,
            created_at: now,
        };

        context.tasks[task_idx].apply_logged_time(log.logged_time, remaining, now);

        if let (Some(index), Some(sprint_id)) = (sprint_idx, sprint_id) {
            let column_idx =
                board_sync::column_index_for_task(&context.sprints[index], &context.tasks[task_idx])
                    .ok_or_else(|| {
                        SprintboardError::Internal(format!(
                            "Task {} points at sprint {} but has no column entry",
                            log.task_id, sprint_id
                        ))
                    })?;
            let column = &mut context.sprints[index].columns[column_idx];
            if let Some(entry_idx) = column.active_entry_index(log.task_id) {
                column.tasks[entry_idx].total_logged_time += log.logged_time;
            }
            context.refresh_sprint_totals(index);

            let report_idx = context.report_index(sprint_id)?;
            report::patch_on_time_log(
                &mut context.reports[report_idx],
                &context.tasks[task_idx],
                &log,
            )?;
        }

        context.record(
            HistoryAction::TimeLogged {
                seconds: log.logged_time,
            },
            log.task_id,
            sprint_id,
        );
        context.time_logs.push(log.clone());

        Ok(TimeLogOutcome {
            time_log: log,
            task: context.tasks[task_idx].clone(),
        })
    }

    fn description(&self) -> String {
        format!(
            "Log {}s on task {}",
            self.submission.logged_time, self.submission.task_id
        )
    }
}
