//! Sprint summary and detail views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;

use crate::project::{Board, StatusId, UserId};
use crate::sprint::{Sprint, SprintColumnId, SprintId, SprintMemberCapacity, SprintStatus};
use crate::task::{Task, TaskId};

/// Headline figures of one sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintSummary {
    pub id: SprintId,
    pub name: String,
    pub goal: String,
    pub status: Option<SprintStatus>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub task_count: usize,
    pub total_capacity: Seconds,
    pub total_estimation: Seconds,
    pub total_logged_time: Seconds,
    pub total_over_logged_time: Seconds,
    pub total_remaining_capacity: i64,
    pub total_remaining_time: Seconds,
    pub progress: f64,
    pub over_progress: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintTaskView {
    pub task_id: TaskId,
    pub title: String,
    pub assignee_id: Option<UserId>,
    pub estimated_time: Seconds,
    pub remaining_time: Seconds,
    /// Logged while in this sprint.
    pub logged_in_sprint: Seconds,
    pub progress: f64,
    pub over_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintColumnView {
    pub id: SprintColumnId,
    pub status_id: StatusId,
    /// Board column name, absent when the status left the board.
    pub name: Option<String>,
    pub total_estimation: Seconds,
    pub tasks: Vec<SprintTaskView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SprintDetail {
    #[serde(flatten)]
    pub summary: SprintSummary,
    pub columns: Vec<SprintColumnView>,
    pub members: Vec<SprintMemberCapacity>,
}

pub fn sprint_summary(sprint: &Sprint) -> SprintSummary {
    SprintSummary {
        id: sprint.id,
        name: sprint.name.clone(),
        goal: sprint.goal.clone(),
        status: sprint.status,
        start_date: sprint.start_date,
        end_date: sprint.end_date,
        task_count: sprint.active_entries().count(),
        total_capacity: sprint.total_capacity,
        total_estimation: sprint.total_estimation,
        total_logged_time: sprint.total_logged_time,
        total_over_logged_time: sprint.total_over_logged_time,
        total_remaining_capacity: sprint.total_remaining_capacity,
        total_remaining_time: sprint.total_remaining_time,
        progress: sprint.progress,
        over_progress: sprint.over_progress,
        updated_at: sprint.updated_at,
    }
}

/// Full board view of a sprint. Entries whose task is unknown are skipped.
pub fn sprint_detail(sprint: &Sprint, board: &Board, tasks: &[Task]) -> SprintDetail {
    let columns = sprint
        .columns
        .iter()
        .map(|column| SprintColumnView {
            id: column.id,
            status_id: column.status_id,
            name: board.status_name(column.status_id).map(str::to_string),
            total_estimation: column.total_estimation,
            tasks: column
                .active_tasks()
                .filter_map(|entry| {
                    tasks
                        .iter()
                        .find(|t| t.id == entry.task_id)
                        .map(|task| SprintTaskView {
                            task_id: task.id,
                            title: task.title.clone(),
                            assignee_id: task.assignee_id,
                            estimated_time: task.estimated_time,
                            remaining_time: task.remaining_time,
                            logged_in_sprint: entry.total_logged_time,
                            progress: task.progress,
                            over_progress: task.over_progress,
                        })
                })
                .collect(),
        })
        .collect();

    SprintDetail {
        summary: sprint_summary(sprint),
        columns,
        members: sprint.members.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::BoardColumn;
    use crate::sprint::SprintColumn;
    use uuid::Uuid;

    #[test]
    fn detail_lists_active_tasks_with_column_names() {
        let todo = Uuid::new_v4();
        let gone = Uuid::new_v4();
        let board = Board::new(vec![BoardColumn::new(todo, "Todo")]);
        let mut sprint = Sprint::new(
            Uuid::new_v4(),
            "Sprint".to_string(),
            "Ship it".to_string(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 14).unwrap(),
            Uuid::new_v4(),
            Utc::now(),
        );
        let mut task = Task::new(sprint.project_id, "Write docs", todo);
        task.set_estimate(3_600);
        let removed = Task::new(sprint.project_id, "Dropped", todo);

        let mut column = SprintColumn::new(todo);
        column.push_entry(task.id, 3_600, Uuid::new_v4(), Utc::now(), 600);
        column.push_entry(removed.id, 0, Uuid::new_v4(), Utc::now(), 0);
        column.soft_remove(1, 0, Uuid::new_v4(), Utc::now());
        sprint.columns = vec![column, SprintColumn::new(gone)];

        let detail = sprint_detail(&sprint, &board, &[task.clone(), removed]);

        assert_eq!(detail.summary.task_count, 1);
        assert_eq!(detail.columns[0].name.as_deref(), Some("Todo"));
        assert_eq!(detail.columns[0].tasks.len(), 1);
        assert_eq!(detail.columns[0].tasks[0].logged_in_sprint, 600);
        assert_eq!(detail.columns[1].name, None);
    }
}
