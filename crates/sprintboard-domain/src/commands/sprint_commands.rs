use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprintboard_core::{Rejection, RejectionCode, Seconds, SprintboardError, SprintboardResult};
use tracing::debug;

use super::{Command, CommandContext};
use crate::board_sync;
use crate::capacity::{self, Admission};
use crate::events::SprintEvent;
use crate::history::HistoryAction;
use crate::project::{ProjectId, UserId, WorkingDay};
use crate::report;
use crate::sprint::{
    name_key, NewSprint, Sprint, SprintColumn, SprintColumnId, SprintId, SprintMemberCapacity,
    SprintStatus, SprintUpdate,
};
use crate::task::{Task, TaskId};

/// Sprint fields that passed validation, trimmed.
struct SprintFields {
    name: String,
    goal: String,
    start: NaiveDate,
    end: NaiveDate,
}

/// Trimmed name and goal plus both dates, checked against `today`.
fn validate_sprint_fields(
    name: &str,
    goal: Option<&str>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> SprintboardResult<SprintFields> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SprintboardError::Validation(
            "Sprint name cannot be empty".to_string(),
        ));
    }
    let goal = goal.map(str::trim).unwrap_or_default();
    if goal.is_empty() {
        return Err(SprintboardError::Validation(
            "Sprint goal cannot be empty".to_string(),
        ));
    }
    let start = start_date
        .ok_or_else(|| SprintboardError::Validation("Start date is required".to_string()))?;
    let end =
        end_date.ok_or_else(|| SprintboardError::Validation("End date is required".to_string()))?;
    if start < today {
        return Err(SprintboardError::Validation(format!(
            "Start date {} is in the past",
            start
        )));
    }
    if end < start {
        return Err(SprintboardError::Validation(format!(
            "End date {} is before start date {}",
            end, start
        )));
    }
    Ok(SprintFields {
        name: name.to_string(),
        goal: goal.to_string(),
        start,
        end,
    })
}

fn ensure_unique_name(
    ctx: &CommandContext,
    project_id: ProjectId,
    name: &str,
    except: Option<SprintId>,
) -> SprintboardResult<()> {
    let key = name_key(name);
    if let Some(existing) = ctx
        .sprints
        .iter()
        .filter(|s| s.project_id == project_id && Some(s.id) != except)
        .find(|s| name_key(&s.name) == key)
    {
        return Err(Rejection::new(
            RejectionCode::DuplicateName,
            Some(existing.id),
            format!("A sprint named '{}' already exists", existing.name),
        )
        .into());
    }
    Ok(())
}

/// Create a draft sprint mirroring the project's board and roster, together
/// with its report. Returns the new sprint's index.
fn create_sprint(
    ctx: &mut CommandContext,
    project_id: ProjectId,
    payload: &NewSprint,
) -> SprintboardResult<usize> {
    let project_idx = ctx.project_index(project_id)?;
    let fields = validate_sprint_fields(
        &payload.name,
        payload.goal.as_deref(),
        payload.start_date,
        payload.end_date,
        ctx.request.today(),
    )?;
    ensure_unique_name(ctx, project_id, &fields.name, None)?;

    let project = &ctx.projects[project_idx];
    let mut sprint = Sprint::new(
        project_id,
        fields.name,
        fields.goal,
        fields.start,
        fields.end,
        ctx.request.actor_id,
        ctx.request.now,
    );
    sprint.members = project
        .accepted_members()
        .map(SprintMemberCapacity::from)
        .collect();
    sprint.columns = project
        .active_board
        .visible_columns()
        .map(|c| SprintColumn::new(c.header_status_id))
        .collect();
    sprint.recompute_capacity();

    ctx.reports
        .push(report::create_from_sprint(&sprint, ctx.request.now));
    ctx.sprints.push(sprint);
    Ok(ctx.sprints.len() - 1)
}

/// Place an already validated task into the sprint and patch everything that
/// mirrors sprint membership.
fn admit_task(ctx: &mut CommandContext, sprint_idx: usize, task_idx: usize) -> SprintboardResult<()> {
    let actor = ctx.request.actor_id;
    let now = ctx.request.now;

    board_sync::place_task_in_column(
        &mut ctx.sprints[sprint_idx],
        &mut ctx.tasks[task_idx],
        actor,
        now,
    )?;
    let sprint_id = ctx.sprints[sprint_idx].id;
    ctx.tasks[task_idx].assign_to_sprint(sprint_id, now);
    ctx.refresh_sprint_totals(sprint_idx);

    let report_idx = ctx.report_index(sprint_id)?;
    report::patch_on_task_add(&mut ctx.reports[report_idx], &ctx.tasks[task_idx], now)?;

    let task_id = ctx.tasks[task_idx].id;
    ctx.record(HistoryAction::AddedToSprint, task_id, Some(sprint_id));
    Ok(())
}

fn publish(ctx: &mut CommandContext, project_idx: usize, sprint_idx: usize) -> SprintboardResult<()> {
    let today = ctx.request.today();
    let sprint = &ctx.sprints[sprint_idx];
    sprint.ensure_draft()?;
    if sprint.start_date < today || sprint.end_date < today {
        return Err(SprintboardError::Validation(format!(
            "Sprint '{}' dates must not be in the past",
            sprint.name
        )));
    }
    if !sprint.has_active_tasks() {
        return Err(Rejection::new(
            RejectionCode::NoTasks,
            Some(sprint.id),
            format!("Sprint '{}' has no tasks", sprint.name),
        )
        .into());
    }

    let sprint = &mut ctx.sprints[sprint_idx];
    sprint.set_status(SprintStatus::InProgress, ctx.request.actor_id, ctx.request.now);
    let sprint_id = sprint.id;
    let sprint_name = sprint.name.clone();

    let project = &mut ctx.projects[project_idx];
    project.set_active_sprint(Some(sprint_id), ctx.request.now);
    let recipients = project.accepted_members().map(|m| m.user_id).collect();

    ctx.events.push(SprintEvent::Published {
        project_id: project.id,
        sprint_id,
        sprint_name,
        recipients,
        locale: ctx.request.locale.clone(),
    });
    Ok(())
}

/// Create a new draft sprint
pub struct CreateSprint {
    pub project_id: ProjectId,
    pub sprint: NewSprint,
}

impl Command for CreateSprint {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let index = create_sprint(context, self.project_id, &self.sprint)?;
        Ok(context.sprints[index].clone())
    }

    fn description(&self) -> String {
        format!("Create sprint '{}'", self.sprint.name.trim())
    }
}

/// Edit name, goal or dates of a draft sprint
pub struct UpdateSprint {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub updates: SprintUpdate,
}

impl Command for UpdateSprint {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let index = context.sprint_index(self.project_id, self.sprint_id)?;
        let current = &context.sprints[index];
        current.ensure_draft()?;

        let merged_name = self
            .updates
            .name
            .clone()
            .unwrap_or_else(|| current.name.clone());
        let merged_goal = self.updates.goal.as_deref().unwrap_or(&current.goal);
        let fields = validate_sprint_fields(
            &merged_name,
            Some(merged_goal),
            Some(self.updates.start_date.unwrap_or(current.start_date)),
            Some(self.updates.end_date.unwrap_or(current.end_date)),
            context.request.today(),
        )?;
        ensure_unique_name(context, self.project_id, &fields.name, Some(self.sprint_id))?;

        let updates = SprintUpdate {
            name: Some(fields.name),
            goal: Some(fields.goal),
            start_date: Some(fields.start),
            end_date: Some(fields.end),
        };

        let sprint = &mut context.sprints[index];
        sprint.update(updates, context.request.now);
        Ok(sprint.clone())
    }

    fn description(&self) -> String {
        format!("Update sprint {}", self.sprint_id)
    }
}

/// Admit a backlog task into a sprint
pub struct AddTaskToSprint {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub task_id: TaskId,
    pub adjust_hours_allowed: bool,
}

impl Command for AddTaskToSprint {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        let task_idx = context.task_index(self.project_id, self.task_id)?;

        let sprint = &context.sprints[sprint_idx];
        sprint.ensure_accepts_new_work(context.request.today())?;
        if sprint.contains_task(self.task_id) {
            return Err(Rejection::new(
                RejectionCode::AlreadyInSprint,
                Some(self.task_id),
                format!("Task is already in sprint '{}'", sprint.name),
            )
            .into());
        }

        let sprint_tasks: Vec<&Task> = context
            .tasks
            .iter()
            .filter(|t| t.id != self.task_id && sprint.contains_task(t.id))
            .collect();
        capacity::validate_admission(
            &context.tasks[task_idx],
            sprint,
            &sprint_tasks,
            self.adjust_hours_allowed,
        )?;

        admit_task(context, sprint_idx, task_idx)?;
        Ok(context.sprints[sprint_idx].clone())
    }

    fn description(&self) -> String {
        format!("Add task {} to sprint {}", self.task_id, self.sprint_id)
    }
}

/// Send a task back to the backlog, keeping its column entry as history
pub struct RemoveTaskFromSprint {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub task_id: TaskId,
}

impl Command for RemoveTaskFromSprint {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        let task_idx = context.task_index(self.project_id, self.task_id)?;
        let actor = context.request.actor_id;
        let now = context.request.now;

        let sprint = &context.sprints[sprint_idx];
        sprint.ensure_open()?;
        let column_idx = board_sync::column_index_for_task(sprint, &context.tasks[task_idx])
            .ok_or_else(|| {
                SprintboardError::NotFound(format!(
                    "Task {} is not in sprint '{}'",
                    self.task_id, sprint.name
                ))
            })?;

        let estimate = context.tasks[task_idx].estimated_time;
        let column = &mut context.sprints[sprint_idx].columns[column_idx];
        if let Some(entry_idx) = column.active_entry_index(self.task_id) {
            column.soft_remove(entry_idx, estimate, actor, now);
        }
        context.tasks[task_idx].return_to_backlog(now);
        context.refresh_sprint_totals(sprint_idx);

        let report_idx = context.report_index(self.sprint_id)?;
        report::patch_on_task_remove(&mut context.reports[report_idx], self.task_id, actor, now)?;
        context.record(
            HistoryAction::RemovedFromSprint,
            self.task_id,
            Some(self.sprint_id),
        );
        Ok(context.sprints[sprint_idx].clone())
    }

    fn description(&self) -> String {
        format!("Remove task {} from sprint {}", self.task_id, self.sprint_id)
    }
}

/// Move a task to another column of the same sprint
pub struct MoveTaskToColumn {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub task_id: TaskId,
    pub target_column_id: SprintColumnId,
}

impl Command for MoveTaskToColumn {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        let task_idx = context.task_index(self.project_id, self.task_id)?;
        let actor = context.request.actor_id;
        let now = context.request.now;

        let sprint = &context.sprints[sprint_idx];
        sprint.ensure_open()?;
        let to = board_sync::column_index_for_column(sprint, self.target_column_id).ok_or_else(
            || SprintboardError::NotFound(format!("Column {} not found", self.target_column_id)),
        )?;
        let task = &context.tasks[task_idx];
        let from = board_sync::column_index_for_task(sprint, task).ok_or_else(|| {
            SprintboardError::NotFound(format!(
                "Task {} is not in sprint '{}'",
                self.task_id, sprint.name
            ))
        })?;
        if from == to {
            return Err(SprintboardError::Validation(
                "Task is already in the target column".to_string(),
            ));
        }
        capacity::check_assignable(task, Admission::MoveWithinSprint)?;

        let from_status = sprint.columns[from].status_id;
        let to_status = sprint.columns[to].status_id;
        board_sync::relocate_task(
            &mut context.sprints[sprint_idx],
            &mut context.tasks[task_idx],
            actor,
            now,
            from,
            to,
        )?;
        context.refresh_sprint_totals(sprint_idx);

        let report_idx = context.report_index(self.sprint_id)?;
        report::patch_on_task_move(&mut context.reports[report_idx], self.task_id, to_status, now)?;
        context.record(
            HistoryAction::MovedColumn {
                from_status,
                to_status,
            },
            self.task_id,
            Some(self.sprint_id),
        );
        Ok(context.sprints[sprint_idx].clone())
    }

    fn description(&self) -> String {
        format!(
            "Move task {} to column {}",
            self.task_id, self.target_column_id
        )
    }
}

/// New capacity figures for one sprint member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberCapacityUpdate {
    pub user_id: UserId,
    pub working_capacity: Seconds,
    pub working_capacity_per_day: Seconds,
    pub working_days: Vec<WorkingDay>,
}

/// Replace member capacities of a draft sprint
pub struct UpdateMemberCapacity {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub capacities: Vec<MemberCapacityUpdate>,
}

impl Command for UpdateMemberCapacity {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        let sprint = &context.sprints[sprint_idx];
        sprint.ensure_draft()?;

        for update in &self.capacities {
            if sprint.member(update.user_id).is_none() {
                return Err(Rejection::new(
                    RejectionCode::MemberNotInSprint,
                    Some(update.user_id),
                    format!("User {} is not a member of sprint '{}'", update.user_id, sprint.name),
                )
                .into());
            }
            if !WorkingDay::is_canonical_week(&update.working_days) {
                return Err(SprintboardError::Validation(format!(
                    "Working days for {} must list each weekday exactly once",
                    update.user_id
                )));
            }
        }

        let sprint = &mut context.sprints[sprint_idx];
        for update in &self.capacities {
            if let Some(member) = sprint.member_mut(update.user_id) {
                member.working_capacity = update.working_capacity;
                member.working_capacity_per_day = update.working_capacity_per_day;
                member.working_days = update.working_days.clone();
            }
        }
        sprint.recompute_capacity();
        sprint.updated_at = context.request.now;

        let report_idx = context.report_index(self.sprint_id)?;
        report::patch_member_capacity(
            &mut context.reports[report_idx],
            &context.sprints[sprint_idx],
            context.request.now,
        )?;
        Ok(context.sprints[sprint_idx].clone())
    }

    fn description(&self) -> String {
        format!("Update member capacity of sprint {}", self.sprint_id)
    }
}

/// Start a draft sprint
pub struct PublishSprint {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
}

impl Command for PublishSprint {
    type Output = Sprint;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Sprint> {
        let project_idx = context.project_index(self.project_id)?;
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        publish(context, project_idx, sprint_idx)?;
        Ok(context.sprints[sprint_idx].clone())
    }

    fn description(&self) -> String {
        format!("Publish sprint {}", self.sprint_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseSprintOptions {
    #[serde(default)]
    pub create_new_sprint: bool,
    #[serde(default)]
    pub new_sprint: Option<NewSprint>,
    /// Publish the follow-on sprint right away. Ignored without
    /// `create_new_sprint`.
    #[serde(default)]
    pub create_and_publish: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseOutcome {
    pub closed_sprint_id: SprintId,
    pub new_sprint_id: Option<SprintId>,
    pub finished: Vec<TaskId>,
    pub unfinished: Vec<TaskId>,
}

/// Close an in-progress sprint, optionally carrying unfinished work over
pub struct CloseSprint {
    pub project_id: ProjectId,
    pub sprint_id: SprintId,
    pub options: CloseSprintOptions,
}

impl Command for CloseSprint {
    type Output = CloseOutcome;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<CloseOutcome> {
        let project_idx = context.project_index(self.project_id)?;
        let sprint_idx = context.sprint_index(self.project_id, self.sprint_id)?;
        let actor = context.request.actor_id;
        let now = context.request.now;

        let sprint = &context.sprints[sprint_idx];
        match sprint.status {
            Some(SprintStatus::InProgress) => {}
            None => {
                return Err(Rejection::new(
                    RejectionCode::NotPublished,
                    Some(sprint.id),
                    format!("Sprint '{}' has not been published", sprint.name),
                )
                .into())
            }
            Some(_) => sprint.ensure_open()?,
        }
        if !sprint.has_active_tasks() {
            return Err(Rejection::new(
                RejectionCode::NoTasks,
                Some(sprint.id),
                format!("Sprint '{}' has no tasks", sprint.name),
            )
            .into());
        }
        let new_sprint = match (self.options.create_new_sprint, self.options.new_sprint.as_ref()) {
            (true, None) => {
                return Err(SprintboardError::Validation(
                    "New sprint details are required".to_string(),
                ))
            }
            (true, Some(payload)) => Some(payload),
            (false, _) => None,
        };

        // the last visible board column is the "done" column
        let finished_status = context.projects[project_idx]
            .active_board
            .last_visible_status();
        let tasks: &[Task] = &context.tasks[..];
        let (finished, unfinished): (Vec<TaskId>, Vec<TaskId>) =
            sprint.active_task_ids().into_iter().partition(|id| {
                tasks
                    .iter()
                    .find(|t| t.id == *id)
                    .is_some_and(|t| Some(t.status_id) == finished_status)
            });
        debug!(
            sprint = %self.sprint_id,
            finished = finished.len(),
            unfinished = unfinished.len(),
            "Partitioned sprint tasks"
        );

        context.refresh_sprint_totals(sprint_idx);
        let report_idx = context.report_index(self.sprint_id)?;
        report::finalize_for_closed_sprint(
            &mut context.reports[report_idx],
            &context.sprints[sprint_idx],
            &context.tasks[..],
            now,
        )?;
        context.sprints[sprint_idx].set_status(SprintStatus::Closed, actor, now);

        let leaving: Vec<TaskId> = match new_sprint {
            Some(_) => finished.clone(),
            None => finished.iter().chain(unfinished.iter()).copied().collect(),
        };
        for task_id in &leaving {
            let task_idx = context.task_index(self.project_id, *task_id)?;
            context.tasks[task_idx].return_to_backlog(now);
            context.record(HistoryAction::RemovedFromSprint, *task_id, Some(self.sprint_id));
        }

        let mut new_sprint_id = None;
        if let Some(payload) = new_sprint {
            let new_idx = create_sprint(context, self.project_id, payload)?;
            for task_id in &unfinished {
                let task_idx = context.task_index(self.project_id, *task_id)?;
                context.tasks[task_idx].return_to_backlog(now);
                context.record(HistoryAction::RemovedFromSprint, *task_id, Some(self.sprint_id));
                admit_task(context, new_idx, task_idx)?;
            }
            // nothing carried over means nothing to publish; the follow-up stays a draft
            if self.options.create_and_publish && !unfinished.is_empty() {
                publish(context, project_idx, new_idx)?;
            }
            new_sprint_id = Some(context.sprints[new_idx].id);
        }

        let project = &mut context.projects[project_idx];
        if project.sprint_id == Some(self.sprint_id) {
            project.set_active_sprint(None, now);
        }
        let recipients = project.accepted_members().map(|m| m.user_id).collect();
        context.events.push(SprintEvent::Closed {
            project_id: self.project_id,
            sprint_id: self.sprint_id,
            sprint_name: context.sprints[sprint_idx].name.clone(),
            next_sprint_id: new_sprint_id,
            recipients,
            locale: context.request.locale.clone(),
        });

        Ok(CloseOutcome {
            closed_sprint_id: self.sprint_id,
            new_sprint_id,
            finished,
            unfinished,
        })
    }

    fn description(&self) -> String {
        format!("Close sprint {}", self.sprint_id)
    }
}

/// Realign the columns of every open sprint with the project's board
pub struct SyncSprintColumns {
    pub project_id: ProjectId,
}

impl Command for SyncSprintColumns {
    type Output = Vec<SprintId>;

    fn execute(&self, context: &mut CommandContext) -> SprintboardResult<Vec<SprintId>> {
        let project_idx = context.project_index(self.project_id)?;
        let board = context.projects[project_idx].active_board.clone();

        let open: Vec<usize> = context
            .sprints
            .iter()
            .enumerate()
            .filter(|(_, s)| s.project_id == self.project_id && !s.is_finished())
            .map(|(i, _)| i)
            .collect();

        let mut changed = Vec::new();
        for index in open {
            if board_sync::reassign_columns_on_board_change(&board, &mut context.sprints[index]) {
                changed.push(context.sprints[index].id);
            }
            context.refresh_sprint_totals(index);
        }
        Ok(changed)
    }

    fn description(&self) -> String {
        format!("Sync sprint columns of project {}", self.project_id)
    }
}
