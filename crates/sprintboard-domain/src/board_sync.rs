//! Sprint column business rules.
//!
//! Pure functions that keep a sprint's columns aligned with the project
//! board and move task entries between them while keeping the estimation
//! totals consistent.

use chrono::{DateTime, Utc};
use sprintboard_core::{SprintboardError, SprintboardResult};

use crate::project::{Board, StatusId, UserId};
use crate::sprint::{Sprint, SprintColumn, SprintColumnId};
use crate::task::Task;

/// Sprint column currently holding the task's active entry.
pub fn column_index_for_task(sprint: &Sprint, task: &Task) -> Option<usize> {
    sprint
        .columns
        .iter()
        .position(|c| c.active_entry_index(task.id).is_some())
}

pub fn column_index_for_column(sprint: &Sprint, column_id: SprintColumnId) -> Option<usize> {
    sprint.columns.iter().position(|c| c.id == column_id)
}

/// Append an active entry for `task` to the column matching its status and
/// add its estimate to the column and sprint totals.
///
/// A task whose status has no sprint column lands in the first column and
/// takes that column's status. Returns the column index used.
pub fn place_task_in_column(
    sprint: &mut Sprint,
    task: &mut Task,
    actor: UserId,
    at: DateTime<Utc>,
) -> SprintboardResult<usize> {
    let index = match sprint
        .columns
        .iter()
        .position(|c| c.status_id == task.status_id)
    {
        Some(index) => index,
        None if !sprint.columns.is_empty() => {
            task.update_status(sprint.columns[0].status_id, at);
            0
        }
        None => {
            return Err(SprintboardError::Validation(format!(
                "Sprint '{}' has no columns",
                sprint.name
            )))
        }
    };

    sprint.columns[index].push_entry(task.id, task.estimated_time, actor, at, 0);
    sprint.total_estimation += task.estimated_time;
    sprint.total_remaining_capacity =
        sprint.total_capacity as i64 - sprint.total_estimation as i64;
    Ok(index)
}

/// Move the task's active entry from column `from` to column `to`.
///
/// The entry is taken out of the source column, and a fresh entry carrying
/// the cached logged time is appended to the destination. The task takes the
/// destination column's status. Sprint-level totals are unchanged.
pub fn relocate_task(
    sprint: &mut Sprint,
    task: &mut Task,
    actor: UserId,
    at: DateTime<Utc>,
    from: usize,
    to: usize,
) -> SprintboardResult<()> {
    if from == to {
        return Err(SprintboardError::Validation(
            "Source and target columns are the same".to_string(),
        ));
    }
    if to >= sprint.columns.len() {
        return Err(SprintboardError::NotFound(format!(
            "Target column {} not found",
            to
        )));
    }
    let entry_index = sprint
        .columns
        .get(from)
        .and_then(|c| c.active_entry_index(task.id))
        .ok_or_else(|| {
            SprintboardError::NotFound(format!("Task {} is not in the source column", task.id))
        })?;

    let entry = sprint.columns[from]
        .take_entry(entry_index, task.estimated_time)
        .ok_or_else(|| SprintboardError::Internal("column entry vanished".to_string()))?;

    let target = &mut sprint.columns[to];
    target.push_entry(
        task.id,
        task.estimated_time,
        actor,
        at,
        entry.total_logged_time,
    );
    task.update_status(target.status_id, at);
    sprint.updated_at = at;
    Ok(())
}

/// Realign sprint columns with the board's visible column order.
///
/// Existing columns are matched by status id and keep their entries and
/// totals. New visible statuses get empty columns. Columns whose status is
/// no longer visible survive at the end only while they hold active tasks.
/// Returns true when the column layout changed.
pub fn reassign_columns_on_board_change(board: &Board, sprint: &mut Sprint) -> bool {
    let before: Vec<StatusId> = sprint.columns.iter().map(|c| c.status_id).collect();
    let mut remaining: Vec<SprintColumn> = std::mem::take(&mut sprint.columns);
    let mut ordered = Vec::with_capacity(remaining.len());

    for board_column in board.visible_columns() {
        let status_id = board_column.header_status_id;
        match remaining.iter().position(|c| c.status_id == status_id) {
            Some(pos) => ordered.push(remaining.remove(pos)),
            None => ordered.push(SprintColumn::new(status_id)),
        }
    }

    ordered.extend(remaining.into_iter().filter(|c| c.has_active_tasks()));
    sprint.columns = ordered;

    let after: Vec<StatusId> = sprint.columns.iter().map(|c| c.status_id).collect();
    before != after
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::BoardColumn;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn board_with(statuses: &[StatusId]) -> Board {
        Board::new(
            statuses
                .iter()
                .enumerate()
                .map(|(i, &s)| BoardColumn::new(s, format!("Column {}", i)))
                .collect(),
        )
    }

    fn sprint_for(board: &Board) -> Sprint {
        let mut sprint = Sprint::new(
            Uuid::new_v4(),
            "Sprint".to_string(),
            "Ship it".to_string(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 14).unwrap(),
            Uuid::new_v4(),
            Utc::now(),
        );
        sprint.columns = board
            .visible_columns()
            .map(|c| SprintColumn::new(c.header_status_id))
            .collect();
        sprint.total_capacity = 100_000;
        sprint
    }

    fn task_with_status(status_id: StatusId, estimate: u64) -> Task {
        let mut task = Task::new(Uuid::new_v4(), "Task", status_id);
        task.set_estimate(estimate);
        task
    }

    #[test]
    fn lookups_resolve_by_id() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let sprint = sprint_for(&board_with(&statuses));
        let column_id = sprint.columns[1].id;
        assert_eq!(column_index_for_column(&sprint, column_id), Some(1));
        assert_eq!(column_index_for_column(&sprint, Uuid::new_v4()), None);
    }

    #[test]
    fn place_task_updates_column_and_sprint_totals() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let board = board_with(&statuses);
        let mut sprint = sprint_for(&board);
        let mut task = task_with_status(statuses[1], 3_600);

        let index = place_task_in_column(&mut sprint, &mut task, Uuid::new_v4(), Utc::now()).unwrap();

        assert_eq!(index, 1);
        assert_eq!(sprint.columns[1].total_estimation, 3_600);
        assert_eq!(sprint.total_estimation, 3_600);
        assert_eq!(sprint.total_remaining_capacity, 100_000 - 3_600);
        assert_eq!(column_index_for_task(&sprint, &task), Some(1));
    }

    #[test]
    fn place_task_with_unknown_status_uses_first_column() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let board = board_with(&statuses);
        let mut sprint = sprint_for(&board);
        let mut task = task_with_status(Uuid::new_v4(), 3_600);

        let index = place_task_in_column(&mut sprint, &mut task, Uuid::new_v4(), Utc::now()).unwrap();

        assert_eq!(index, 0);
        assert_eq!(task.status_id, statuses[0]);
    }

    #[test]
    fn place_task_without_columns_is_rejected() {
        let mut sprint = sprint_for(&board_with(&[]));
        let mut task = task_with_status(Uuid::new_v4(), 3_600);
        let result = place_task_in_column(&mut sprint, &mut task, Uuid::new_v4(), Utc::now());
        assert!(matches!(result, Err(SprintboardError::Validation(_))));
    }

    #[test]
    fn relocate_carries_logged_time_and_status() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let board = board_with(&statuses);
        let mut sprint = sprint_for(&board);
        let actor = Uuid::new_v4();
        let mut task = task_with_status(statuses[0], 7_200);
        place_task_in_column(&mut sprint, &mut task, actor, Utc::now()).unwrap();
        sprint.columns[0].tasks[0].total_logged_time = 1_800;

        relocate_task(&mut sprint, &mut task, actor, Utc::now(), 0, 1).unwrap();

        assert!(sprint.columns[0].tasks.is_empty());
        assert_eq!(sprint.columns[0].total_estimation, 0);
        assert_eq!(sprint.columns[1].total_estimation, 7_200);
        assert_eq!(sprint.columns[1].tasks[0].total_logged_time, 1_800);
        assert_eq!(sprint.total_estimation, 7_200);
        assert_eq!(task.status_id, statuses[1]);
    }

    #[test]
    fn relocate_there_and_back_restores_source() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let board = board_with(&statuses);
        let mut sprint = sprint_for(&board);
        let actor = Uuid::new_v4();
        let mut task = task_with_status(statuses[0], 7_200);
        place_task_in_column(&mut sprint, &mut task, actor, Utc::now()).unwrap();

        relocate_task(&mut sprint, &mut task, actor, Utc::now(), 0, 1).unwrap();
        relocate_task(&mut sprint, &mut task, actor, Utc::now(), 1, 0).unwrap();

        assert_eq!(sprint.columns[0].total_estimation, 7_200);
        assert_eq!(sprint.columns[1].total_estimation, 0);
        assert_eq!(column_index_for_task(&sprint, &task), Some(0));
    }

    #[test]
    fn relocate_rejects_same_column_and_missing_entry() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let mut sprint = sprint_for(&board_with(&statuses));
        let mut task = task_with_status(statuses[0], 60);
        let actor = Uuid::new_v4();

        assert!(matches!(
            relocate_task(&mut sprint, &mut task, actor, Utc::now(), 0, 0),
            Err(SprintboardError::Validation(_))
        ));
        assert!(matches!(
            relocate_task(&mut sprint, &mut task, actor, Utc::now(), 0, 1),
            Err(SprintboardError::NotFound(_))
        ));
    }

    #[test]
    fn board_change_reorders_adds_and_drops_columns() {
        let todo = Uuid::new_v4();
        let doing = Uuid::new_v4();
        let review = Uuid::new_v4();
        let done = Uuid::new_v4();
        let mut sprint = sprint_for(&board_with(&[todo, doing, review, done]));
        let actor = Uuid::new_v4();
        let mut in_review = task_with_status(review, 3_600);
        place_task_in_column(&mut sprint, &mut in_review, actor, Utc::now()).unwrap();

        // review hidden, doing removed, qa added, order flipped
        let qa = Uuid::new_v4();
        let mut board = board_with(&[done, qa, todo, review]);
        board.columns[3].is_hidden = true;

        assert!(reassign_columns_on_board_change(&board, &mut sprint));

        let statuses: Vec<_> = sprint.columns.iter().map(|c| c.status_id).collect();
        assert_eq!(statuses, vec![done, qa, todo, review]);
        assert_eq!(sprint.columns[3].total_estimation, 3_600);
        assert!(sprint.columns[1].tasks.is_empty());
        assert_eq!(sprint.total_estimation, 3_600);
    }

    #[test]
    fn board_change_without_layout_change_is_noop() {
        let statuses = [Uuid::new_v4(), Uuid::new_v4()];
        let board = board_with(&statuses);
        let mut sprint = sprint_for(&board);
        let ids: Vec<_> = sprint.columns.iter().map(|c| c.id).collect();

        assert!(!reassign_columns_on_board_change(&board, &mut sprint));
        let after: Vec<_> = sprint.columns.iter().map(|c| c.id).collect();
        assert_eq!(ids, after);
    }
}
