//! Capacity admission rules.
//!
//! Pure functions deciding whether a task may enter (or move inside) a sprint
//! without exceeding the sprint's or the assignee's capacity. Rejections are
//! returned as [`Rejection`] values carrying the offending entity id.

use sprintboard_core::{Rejection, RejectionCode, Seconds};

use crate::sprint::Sprint;
use crate::task::Task;

/// Where the candidate task is coming from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Entering the sprint from the backlog.
    NewToSprint,
    /// Moving between columns of the sprint it already belongs to.
    MoveWithinSprint,
}

/// Check that the task can be placed on a sprint board at all.
pub fn check_assignable(task: &Task, admission: Admission) -> Result<(), Rejection> {
    if task.assignee_id.is_none() {
        return Err(Rejection::new(
            RejectionCode::NoAssignee,
            Some(task.id),
            format!("Task '{}' has no assignee", task.title),
        ));
    }
    if task.estimated_time == 0 {
        return Err(Rejection::new(
            RejectionCode::NoEstimate,
            Some(task.id),
            format!("Task '{}' has no estimate", task.title),
        ));
    }
    if admission == Admission::NewToSprint {
        if let Some(sprint_id) = task.sprint_id {
            return Err(Rejection::new(
                RejectionCode::AlreadyInSprint,
                Some(task.id),
                format!("Task '{}' is already in sprint {}", task.title, sprint_id),
            ));
        }
    }
    Ok(())
}

/// Validate admitting `task` into `sprint`.
///
/// `sprint_tasks` are the tasks currently active in the sprint, excluding the
/// candidate. With `adjust_hours_allowed` the capacity checks are skipped once
/// the task is assignable.
pub fn validate_admission(
    task: &Task,
    sprint: &Sprint,
    sprint_tasks: &[&Task],
    adjust_hours_allowed: bool,
) -> Result<(), Rejection> {
    check_assignable(task, Admission::NewToSprint)?;
    if adjust_hours_allowed {
        return Ok(());
    }

    if sprint.total_over_logged_time > 0 {
        return Err(Rejection::new(
            RejectionCode::SprintCapacityExceeded,
            Some(sprint.id),
            format!(
                "Sprint '{}' is already over-logged by {}s",
                sprint.name, sprint.total_over_logged_time
            ),
        ));
    }

    let sprint_total: Seconds = sprint_tasks
        .iter()
        .map(|t| t.estimated_time)
        .sum::<Seconds>()
        + task.estimated_time;
    if sprint_total > sprint.total_capacity {
        return Err(Rejection::new(
            RejectionCode::SprintCapacityExceeded,
            Some(sprint.id),
            format!(
                "Adding '{}' needs {}s but sprint '{}' has a capacity of {}s",
                task.title, sprint_total, sprint.name, sprint.total_capacity
            ),
        ));
    }

    // check_assignable guarantees an assignee
    let Some(assignee_id) = task.assignee_id else {
        return Ok(());
    };
    let member_total: Seconds = sprint_tasks
        .iter()
        .filter(|t| t.assignee_id == Some(assignee_id))
        .map(|t| t.estimated_time)
        .sum::<Seconds>()
        + task.estimated_time;
    let member_capacity = sprint
        .member(assignee_id)
        .map(|m| m.working_capacity)
        .unwrap_or(0);
    if member_total > member_capacity {
        return Err(Rejection::new(
            RejectionCode::MemberCapacityExceeded,
            Some(assignee_id),
            format!(
                "Assignee would carry {}s against a working capacity of {}s",
                member_total, member_capacity
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::WorkingDay;
    use crate::sprint::SprintMemberCapacity;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    const HOUR: Seconds = 3_600;

    fn sprint_with_members(members: &[(Uuid, Seconds)]) -> Sprint {
        let mut sprint = Sprint::new(
            Uuid::new_v4(),
            "Sprint".to_string(),
            "Ship it".to_string(),
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 14).unwrap(),
            Uuid::new_v4(),
            Utc::now(),
        );
        sprint.members = members
            .iter()
            .map(|&(user_id, working_capacity)| SprintMemberCapacity {
                user_id,
                working_capacity,
                working_capacity_per_day: 8 * HOUR,
                working_days: WorkingDay::default_week(),
            })
            .collect();
        sprint.recompute_capacity();
        sprint
    }

    fn task(assignee: Option<Uuid>, estimate: Seconds) -> Task {
        let mut task = Task::new(Uuid::new_v4(), "Task", Uuid::new_v4());
        task.assignee_id = assignee;
        task.set_estimate(estimate);
        task
    }

    #[test]
    fn rejects_unassigned_task() {
        let sprint = sprint_with_members(&[]);
        let candidate = task(None, HOUR);
        let rejection = validate_admission(&candidate, &sprint, &[], true).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::NoAssignee);
        assert_eq!(rejection.entity_id, Some(candidate.id));
    }

    #[test]
    fn rejects_unestimated_task() {
        let sprint = sprint_with_members(&[]);
        let candidate = task(Some(Uuid::new_v4()), 0);
        let rejection = validate_admission(&candidate, &sprint, &[], true).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::NoEstimate);
    }

    #[test]
    fn rejects_task_already_in_a_sprint_unless_moving() {
        let mut candidate = task(Some(Uuid::new_v4()), HOUR);
        candidate.sprint_id = Some(Uuid::new_v4());
        assert_eq!(
            check_assignable(&candidate, Admission::NewToSprint)
                .unwrap_err()
                .code,
            RejectionCode::AlreadyInSprint
        );
        assert!(check_assignable(&candidate, Admission::MoveWithinSprint).is_ok());
    }

    #[test]
    fn adjust_hours_skips_capacity() {
        let dev = Uuid::new_v4();
        let sprint = sprint_with_members(&[(dev, HOUR)]);
        let candidate = task(Some(dev), 10 * HOUR);
        assert!(validate_admission(&candidate, &sprint, &[], true).is_ok());
        assert!(validate_admission(&candidate, &sprint, &[], false).is_err());
    }

    #[test]
    fn rejects_when_sprint_capacity_exceeded() {
        let dev = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sprint = sprint_with_members(&[(dev, 10 * HOUR), (other, 2 * HOUR)]);
        let existing = task(Some(other), 10 * HOUR);
        let candidate = task(Some(dev), 3 * HOUR);

        let rejection = validate_admission(&candidate, &sprint, &[&existing], false).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::SprintCapacityExceeded);
        assert_eq!(rejection.entity_id, Some(sprint.id));
    }

    #[test]
    fn rejects_when_member_capacity_exceeded() {
        let dev = Uuid::new_v4();
        let other = Uuid::new_v4();
        let sprint = sprint_with_members(&[(dev, 4 * HOUR), (other, 40 * HOUR)]);
        let existing = task(Some(dev), 3 * HOUR);
        let candidate = task(Some(dev), 2 * HOUR);

        let rejection = validate_admission(&candidate, &sprint, &[&existing], false).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::MemberCapacityExceeded);
        assert_eq!(rejection.entity_id, Some(dev));
    }

    #[test]
    fn assignee_outside_sprint_has_no_capacity() {
        let dev = Uuid::new_v4();
        let sprint = sprint_with_members(&[(dev, 40 * HOUR)]);
        let candidate = task(Some(Uuid::new_v4()), HOUR);

        let rejection = validate_admission(&candidate, &sprint, &[], false).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::MemberCapacityExceeded);
    }

    #[test]
    fn rejects_over_logged_sprint() {
        let dev = Uuid::new_v4();
        let mut sprint = sprint_with_members(&[(dev, 40 * HOUR)]);
        sprint.total_over_logged_time = 60;
        let candidate = task(Some(dev), HOUR);

        let rejection = validate_admission(&candidate, &sprint, &[], false).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::SprintCapacityExceeded);
    }

    #[test]
    fn admits_exactly_at_capacity() {
        let dev = Uuid::new_v4();
        let sprint = sprint_with_members(&[(dev, 8 * HOUR)]);
        let existing = task(Some(dev), 5 * HOUR);
        let candidate = task(Some(dev), 3 * HOUR);
        assert!(validate_admission(&candidate, &sprint, &[&existing], false).is_ok());
    }
}
