use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;
use uuid::Uuid;

use crate::sprint::SprintId;

pub type ProjectId = Uuid;
pub type UserId = Uuid;
pub type StatusId = Uuid;
pub type BoardId = Uuid;

pub const CANONICAL_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One day of a member's working week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDay {
    pub day: Weekday,
    pub selected: bool,
}

impl WorkingDay {
    /// Monday to Friday selected, weekend unselected.
    pub fn default_week() -> Vec<WorkingDay> {
        CANONICAL_WEEK
            .iter()
            .map(|&day| WorkingDay {
                day,
                selected: !matches!(day, Weekday::Sat | Weekday::Sun),
            })
            .collect()
    }

    pub fn week_with(selected: &[Weekday]) -> Vec<WorkingDay> {
        CANONICAL_WEEK
            .iter()
            .map(|&day| WorkingDay {
                day,
                selected: selected.contains(&day),
            })
            .collect()
    }

    /// True when `days` names each of the seven weekdays exactly once.
    pub fn is_canonical_week(days: &[WorkingDay]) -> bool {
        if days.len() != CANONICAL_WEEK.len() {
            return false;
        }
        let mut seen = 0u8;
        for entry in days {
            seen |= 1 << entry.day.num_days_from_monday();
        }
        seen == 0b111_1111
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: UserId,
    #[serde(default)]
    pub working_capacity: Seconds,
    #[serde(default)]
    pub working_capacity_per_day: Seconds,
    #[serde(default = "WorkingDay::default_week")]
    pub working_days: Vec<WorkingDay>,
    #[serde(default)]
    pub is_invite_accepted: bool,
}

impl ProjectMember {
    pub fn new(user_id: UserId, working_capacity: Seconds, working_capacity_per_day: Seconds) -> Self {
        Self {
            user_id,
            working_capacity,
            working_capacity_per_day,
            working_days: WorkingDay::default_week(),
            is_invite_accepted: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    pub header_status_id: StatusId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_hidden: bool,
}

impl BoardColumn {
    pub fn new(header_status_id: StatusId, name: impl Into<String>) -> Self {
        Self {
            header_status_id,
            name: name.into(),
            is_hidden: false,
        }
    }
}

/// The project's current board layout. Column order is display order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    #[serde(default)]
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn new(columns: Vec<BoardColumn>) -> Self {
        Self {
            id: Uuid::new_v4(),
            columns,
        }
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &BoardColumn> {
        self.columns.iter().filter(|c| !c.is_hidden)
    }

    /// Status of the right-most visible column, which close-sprint treats as "done".
    pub fn last_visible_status(&self) -> Option<StatusId> {
        self.visible_columns().last().map(|c| c.header_status_id)
    }

    pub fn status_name(&self, status_id: StatusId) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.header_status_id == status_id)
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    pub active_board: Board,
    /// The project's active sprint pointer.
    #[serde(default)]
    pub sprint_id: Option<SprintId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>, active_board: Board) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
            active_board,
            sprint_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn accepted_members(&self) -> impl Iterator<Item = &ProjectMember> {
        self.members.iter().filter(|m| m.is_invite_accepted)
    }

    pub fn member(&self, user_id: UserId) -> Option<&ProjectMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn set_active_sprint(&mut self, sprint_id: Option<SprintId>, now: DateTime<Utc>) {
        self.sprint_id = sprint_id;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_week_is_canonical() {
        let week = WorkingDay::default_week();
        assert!(WorkingDay::is_canonical_week(&week));
        assert_eq!(week.iter().filter(|d| d.selected).count(), 5);
    }

    #[test]
    fn test_partial_or_duplicated_week_is_not_canonical() {
        let mut week = WorkingDay::default_week();
        week.pop();
        assert!(!WorkingDay::is_canonical_week(&week));

        week.push(WorkingDay {
            day: Weekday::Mon,
            selected: true,
        });
        assert!(!WorkingDay::is_canonical_week(&week));
    }

    #[test]
    fn test_last_visible_status_skips_hidden() {
        let todo = Uuid::new_v4();
        let done = Uuid::new_v4();
        let archived = Uuid::new_v4();
        let mut hidden = BoardColumn::new(archived, "Archived");
        hidden.is_hidden = true;
        let board = Board::new(vec![
            BoardColumn::new(todo, "Todo"),
            BoardColumn::new(done, "Done"),
            hidden,
        ]);

        assert_eq!(board.last_visible_status(), Some(done));
        assert_eq!(board.visible_columns().count(), 2);
        assert_eq!(board.status_name(archived), Some("Archived"));
    }

    #[test]
    fn test_accepted_members_filters_pending_invites() {
        let mut project = Project::new("Apollo", Board::new(vec![]));
        let accepted = ProjectMember::new(Uuid::new_v4(), 144_000, 28_800);
        let mut pending = ProjectMember::new(Uuid::new_v4(), 144_000, 28_800);
        pending.is_invite_accepted = false;
        project.members = vec![accepted.clone(), pending];

        let ids: Vec<_> = project.accepted_members().map(|m| m.user_id).collect();
        assert_eq!(ids, vec![accepted.user_id]);
    }
}
