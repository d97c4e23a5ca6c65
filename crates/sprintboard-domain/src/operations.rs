use async_trait::async_trait;
use sprintboard_core::SprintboardResult;

use crate::commands::{CloseOutcome, CloseSprintOptions, MemberCapacityUpdate, TimeLogOutcome};
use crate::context::RequestContext;
use crate::project::ProjectId;
use crate::query::{SprintDetail, SprintSummary};
use crate::sprint::{NewSprint, Sprint, SprintColumnId, SprintId, SprintUpdate};
use crate::sprint_report::SprintReport;
use crate::task::TaskId;
use crate::time_log::NewTimeLog;

/// Every operation the sprint engine exposes.
/// Adding a method here forces the engine and any other front end to add it.
#[async_trait]
pub trait SprintOperations: Send + Sync {
    // Lifecycle
    async fn create_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint: NewSprint,
    ) -> SprintboardResult<Sprint>;
    async fn update_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        updates: SprintUpdate,
    ) -> SprintboardResult<Sprint>;
    async fn publish_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<Sprint>;
    async fn close_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        options: CloseSprintOptions,
    ) -> SprintboardResult<CloseOutcome>;

    // Board membership
    async fn add_task_to_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
        adjust_hours_allowed: bool,
    ) -> SprintboardResult<Sprint>;
    async fn remove_task_from_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
    ) -> SprintboardResult<Sprint>;
    async fn move_task_to_column(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
        target_column_id: SprintColumnId,
    ) -> SprintboardResult<Sprint>;
    async fn sync_sprint_columns(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> SprintboardResult<Vec<SprintId>>;

    // Capacity and time
    async fn update_sprint_member_capacity(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        capacities: Vec<MemberCapacityUpdate>,
    ) -> SprintboardResult<Sprint>;
    async fn add_time_log(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        submission: NewTimeLog,
    ) -> SprintboardResult<TimeLogOutcome>;

    // Views
    async fn get_sprint(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintDetail>;
    async fn get_sprint_summary(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintSummary>;
    async fn get_sprint_report(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintReport>;
}
