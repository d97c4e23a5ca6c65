//! Point-in-time capture of every aggregate the engine touches.
//!
//! A unit of work loads one `WorkspaceSnapshot`, mutates a copy through a
//! [`CommandContext`](crate::commands::CommandContext) and saves the copy
//! back. All fields default so partial imports load.

use serde::{Deserialize, Serialize};

use crate::commands::CommandContext;
use crate::context::RequestContext;
use crate::events::SprintEvent;
use crate::history::HistoryRecord;
use crate::project::Project;
use crate::sprint::Sprint;
use crate::sprint_report::SprintReport;
use crate::task::Task;
use crate::time_log::TimeLog;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub sprints: Vec<Sprint>,

    #[serde(default)]
    pub reports: Vec<SprintReport>,

    #[serde(default)]
    pub time_logs: Vec<TimeLog>,

    /// Append-only task history.
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}

impl WorkspaceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.tasks.is_empty()
            && self.sprints.is_empty()
            && self.reports.is_empty()
            && self.time_logs.is_empty()
    }

    /// Borrow every collection mutably for one command run.
    pub fn context<'a>(
        &'a mut self,
        request: &'a RequestContext,
        events: &'a mut Vec<SprintEvent>,
    ) -> CommandContext<'a> {
        CommandContext {
            projects: &mut self.projects,
            tasks: &mut self.tasks,
            sprints: &mut self.sprints,
            reports: &mut self.reports,
            time_logs: &mut self.time_logs,
            history: &mut self.history,
            events,
            request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_snapshot_deserializes() {
        let snapshot: WorkspaceSnapshot = serde_json::from_str(r#"{"tasks": []}"#).unwrap();
        assert!(snapshot.is_empty());
    }
}
