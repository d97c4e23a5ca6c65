pub mod board_sync;
pub mod capacity;
pub mod commands;
pub mod context;
pub mod events;
pub mod history;
pub mod operations;
pub mod progress;
pub mod project;
pub mod query;
pub mod report;
pub mod snapshot;
pub mod sprint;
pub mod sprint_report;
pub mod task;
pub mod time_log;
pub mod time_tracking;

pub use capacity::Admission;
pub use commands::{
    CloseOutcome, CloseSprintOptions, Command, CommandContext, MemberCapacityUpdate,
    TimeLogOutcome,
};
pub use context::RequestContext;
pub use events::SprintEvent;
pub use history::{HistoryAction, HistoryRecord};
pub use operations::SprintOperations;
pub use progress::{compute_progress, ProgressFigures};
pub use project::{
    Board, BoardColumn, BoardId, Project, ProjectId, ProjectMember, StatusId, UserId, WorkingDay,
};
pub use query::{SprintColumnView, SprintDetail, SprintSummary, SprintTaskView};
pub use snapshot::WorkspaceSnapshot;
pub use sprint::{
    EntryState, NewSprint, Sprint, SprintColumn, SprintColumnId, SprintColumnTask, SprintId,
    SprintMemberCapacity, SprintStatus, SprintUpdate,
};
pub use sprint_report::{
    ReportMember, ReportTask, ReportTaskLog, SprintReport, SprintReportId, StatusSummary,
};
pub use task::{Task, TaskId};
pub use time_log::{NewTimeLog, TimeLog, TimeLogId};
