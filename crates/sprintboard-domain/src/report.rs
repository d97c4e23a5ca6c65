//! Sprint report aggregation.
//!
//! The report is created with its sprint, patched by every admission,
//! removal, move and time log, and frozen when the sprint closes. Every patch
//! is refused once the report is finalized.

use chrono::{DateTime, Utc};
use sprintboard_core::{Rejection, RejectionCode};
use uuid::Uuid;

use crate::progress::percent;
use crate::project::{StatusId, UserId};
use crate::sprint::{EntryState, Sprint, SprintMemberCapacity};
use crate::sprint_report::{ReportMember, ReportTask, ReportTaskLog, SprintReport, StatusSummary};
use crate::task::{Task, TaskId};
use crate::time_log::TimeLog;

fn ensure_mutable(report: &SprintReport) -> Result<(), Rejection> {
    if report.is_finalized() {
        return Err(Rejection::new(
            RejectionCode::AlreadyClosed,
            Some(report.sprint_id),
            "Sprint report is finalized".to_string(),
        ));
    }
    Ok(())
}

fn report_member(member: &SprintMemberCapacity) -> ReportMember {
    ReportMember {
        user_id: member.user_id,
        working_capacity: member.working_capacity,
        working_capacity_per_day: member.working_capacity_per_day,
        working_days: member.working_days.clone(),
        total_logged_time: 0,
        productivity: 0.0,
        task_logs: Vec::new(),
    }
}

fn report_task(task: &Task) -> ReportTask {
    ReportTask {
        task_id: task.id,
        title: task.title.clone(),
        type_id: task.type_id,
        priority_id: task.priority_id,
        status_id: task.status_id,
        assignee_id: task.assignee_id,
        estimated_time: task.estimated_time,
        total_logged_time: task.total_logged_time,
        remaining_time: task.remaining_time,
        state: EntryState::Active,
    }
}

fn refresh_task(entry: &mut ReportTask, task: &Task) {
    entry.title = task.title.clone();
    entry.type_id = task.type_id;
    entry.priority_id = task.priority_id;
    entry.status_id = task.status_id;
    entry.assignee_id = task.assignee_id;
    entry.estimated_time = task.estimated_time;
    entry.total_logged_time = task.total_logged_time;
    entry.remaining_time = task.remaining_time;
}

pub fn create_from_sprint(sprint: &Sprint, now: DateTime<Utc>) -> SprintReport {
    SprintReport {
        id: Uuid::new_v4(),
        sprint_id: sprint.id,
        project_id: sprint.project_id,
        report_members: sprint.members.iter().map(report_member).collect(),
        report_tasks: Vec::new(),
        status_summary: Vec::new(),
        total_logged_time: 0,
        finalized_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Record the task as active, re-activating an earlier removed row.
pub fn patch_on_task_add(
    report: &mut SprintReport,
    task: &Task,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;
    match report.task_mut(task.id) {
        Some(entry) => {
            refresh_task(entry, task);
            entry.state = EntryState::Active;
        }
        None => report.report_tasks.push(report_task(task)),
    }
    report.updated_at = now;
    Ok(())
}

pub fn patch_on_task_remove(
    report: &mut SprintReport,
    task_id: TaskId,
    by: UserId,
    at: DateTime<Utc>,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;
    if let Some(entry) = report.task_mut(task_id) {
        entry.state = EntryState::Removed { by, at };
    }
    report.updated_at = at;
    Ok(())
}

pub fn patch_on_task_move(
    report: &mut SprintReport,
    task_id: TaskId,
    status_id: StatusId,
    at: DateTime<Utc>,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;
    if let Some(entry) = report.task_mut(task_id) {
        entry.status_id = status_id;
    }
    report.updated_at = at;
    Ok(())
}

/// Fold an accepted time log into the report. The logger must be a report
/// member.
pub fn patch_on_time_log(
    report: &mut SprintReport,
    task: &Task,
    log: &TimeLog,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;
    let member = report.member_mut(log.created_by).ok_or_else(|| {
        Rejection::new(
            RejectionCode::MemberNotInSprint,
            Some(log.created_by),
            "Time logger is not a member of the sprint".to_string(),
        )
    })?;
    member.total_logged_time += log.logged_time;
    member.task_logs.push(ReportTaskLog {
        time_log_id: log.id,
        task_id: task.id,
        logged_time: log.logged_time,
        logged_at: log.created_at,
    });

    match report.task_mut(task.id) {
        Some(entry) => refresh_task(entry, task),
        None => report.report_tasks.push(report_task(task)),
    }
    report.total_logged_time += log.logged_time;
    report.updated_at = log.created_at;
    Ok(())
}

/// Mirror the sprint's member capacities into the report.
pub fn patch_member_capacity(
    report: &mut SprintReport,
    sprint: &Sprint,
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;
    for member in &sprint.members {
        match report.member_mut(member.user_id) {
            Some(entry) => {
                entry.working_capacity = member.working_capacity;
                entry.working_capacity_per_day = member.working_capacity_per_day;
                entry.working_days = member.working_days.clone();
            }
            None => report.report_members.push(report_member(member)),
        }
    }
    report.updated_at = now;
    Ok(())
}

/// Freeze the report: refresh task figures, build the per-status summary in
/// column order and compute member productivity.
pub fn finalize_for_closed_sprint(
    report: &mut SprintReport,
    sprint: &Sprint,
    tasks: &[Task],
    now: DateTime<Utc>,
) -> Result<(), Rejection> {
    ensure_mutable(report)?;

    for entry in report.report_tasks.iter_mut().filter(|t| t.state.is_active()) {
        if let Some(task) = tasks.iter().find(|t| t.id == entry.task_id) {
            refresh_task(entry, task);
        }
    }

    let mut statuses: Vec<StatusId> = sprint.columns.iter().map(|c| c.status_id).collect();
    for entry in report.active_tasks() {
        if !statuses.contains(&entry.status_id) {
            statuses.push(entry.status_id);
        }
    }
    let summary: Vec<StatusSummary> = statuses
        .into_iter()
        .map(|status_id| {
            let mut summary = StatusSummary {
                status_id,
                task_count: 0,
                estimated_time: 0,
                logged_time: 0,
                remaining_time: 0,
            };
            for entry in report.active_tasks().filter(|t| t.status_id == status_id) {
                summary.task_count += 1;
                summary.estimated_time += entry.estimated_time;
                summary.logged_time += entry.total_logged_time;
                summary.remaining_time += entry.remaining_time;
            }
            summary
        })
        .collect();
    report.status_summary = summary;

    let sprint_logged = report.total_logged_time;
    for member in &mut report.report_members {
        member.productivity = percent(member.total_logged_time, sprint_logged);
    }

    report.finalized_at = Some(now);
    report.updated_at = now;
    Ok(())
}
