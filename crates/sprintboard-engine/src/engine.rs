use std::sync::Arc;

use async_trait::async_trait;
use sprintboard_core::{EngineConfig, SprintboardError, SprintboardResult};
use sprintboard_domain::commands::{
    AddTaskToSprint, AddTimeLog, CloseSprint, Command, CreateSprint, MoveTaskToColumn,
    PublishSprint, RemoveTaskFromSprint, SyncSprintColumns, UpdateMemberCapacity, UpdateSprint,
};
use sprintboard_domain::query::{sprint_detail, sprint_summary};
use sprintboard_domain::{
    CloseOutcome, CloseSprintOptions, MemberCapacityUpdate, NewSprint, NewTimeLog, Project,
    ProjectId, RequestContext, Sprint, SprintColumnId, SprintDetail, SprintId, SprintOperations,
    SprintReport, SprintSummary, SprintUpdate, TaskId, TimeLogOutcome, UserId, WorkspaceSnapshot,
};
use sprintboard_persistence::PersistenceStore;

use crate::notifier::{dispatch_events, Notifier};
use crate::unit_of_work::UnitOfWork;

/// Sprint engine over an injected store and notifier.
///
/// Each mutating call is one unit of work; notifications go out only after
/// the commit and their failures never undo it.
pub struct SprintEngine<S: PersistenceStore> {
    uow: UnitOfWork<S>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl<S: PersistenceStore> SprintEngine<S> {
    pub fn new(store: S, notifier: Arc<dyn Notifier>, config: EngineConfig) -> Self {
        Self {
            uow: UnitOfWork::new(store, config.transient_retries),
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.uow.store()
    }

    /// Request context for `actor_id` in the configured default locale.
    pub fn request(&self, actor_id: UserId) -> RequestContext {
        RequestContext::new(actor_id).with_locale(self.config.default_locale.clone())
    }

    async fn commit<C>(&self, ctx: &RequestContext, command: C) -> SprintboardResult<C::Output>
    where
        C: Command,
        C::Output: Send,
    {
        let description = command.description();
        let committed = self.uow.run(ctx, &command).await?;
        tracing::info!(
            actor = %ctx.actor_id,
            revision = committed.revision,
            "{}",
            description
        );
        dispatch_events(self.notifier.as_ref(), &committed.events).await;
        Ok(committed.output)
    }

    /// The last committed workspace.
    pub async fn export_workspace(&self) -> SprintboardResult<WorkspaceSnapshot> {
        let (workspace, _) = self.uow.read().await?;
        Ok(workspace)
    }

    /// Replace the whole workspace, e.g. to seed collaborator-owned projects
    /// and tasks. Returns the new revision.
    pub async fn import_workspace(
        &self,
        ctx: &RequestContext,
        snapshot: WorkspaceSnapshot,
    ) -> SprintboardResult<u64> {
        let committed = self
            .uow
            .execute(ctx, |c| {
                *c.projects = snapshot.projects.clone();
                *c.tasks = snapshot.tasks.clone();
                *c.sprints = snapshot.sprints.clone();
                *c.reports = snapshot.reports.clone();
                *c.time_logs = snapshot.time_logs.clone();
                *c.history = snapshot.history.clone();
                Ok(())
            })
            .await?;
        tracing::info!(
            revision = committed.revision,
            "Imported workspace with {} projects and {} tasks",
            snapshot.projects.len(),
            snapshot.tasks.len()
        );
        Ok(committed.revision)
    }

    async fn read_sprint<T>(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
        view: impl FnOnce(&WorkspaceSnapshot, &Project, &Sprint) -> SprintboardResult<T>,
    ) -> SprintboardResult<T> {
        let (workspace, _) = self.uow.read().await?;
        let project = workspace
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Project {} not found", project_id)))?;
        let sprint = workspace
            .sprints
            .iter()
            .find(|s| s.id == sprint_id && s.project_id == project_id)
            .ok_or_else(|| SprintboardError::NotFound(format!("Sprint {} not found", sprint_id)))?;
        view(&workspace, project, sprint)
    }
}

#[async_trait]
impl<S: PersistenceStore> SprintOperations for SprintEngine<S> {
    async fn create_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint: NewSprint,
    ) -> SprintboardResult<Sprint> {
        self.commit(ctx, CreateSprint { project_id, sprint }).await
    }

    async fn update_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        updates: SprintUpdate,
    ) -> SprintboardResult<Sprint> {
        let cmd = UpdateSprint {
            project_id,
            sprint_id,
            updates,
        };
        self.commit(ctx, cmd).await
    }

    async fn publish_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<Sprint> {
        self.commit(
            ctx,
            PublishSprint {
                project_id,
                sprint_id,
            },
        )
        .await
    }

    async fn close_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        options: CloseSprintOptions,
    ) -> SprintboardResult<CloseOutcome> {
        let cmd = CloseSprint {
            project_id,
            sprint_id,
            options,
        };
        self.commit(ctx, cmd).await
    }

    async fn add_task_to_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
        adjust_hours_allowed: bool,
    ) -> SprintboardResult<Sprint> {
        let cmd = AddTaskToSprint {
            project_id,
            sprint_id,
            task_id,
            adjust_hours_allowed,
        };
        self.commit(ctx, cmd).await
    }

    async fn remove_task_from_sprint(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
    ) -> SprintboardResult<Sprint> {
        let cmd = RemoveTaskFromSprint {
            project_id,
            sprint_id,
            task_id,
        };
        self.commit(ctx, cmd).await
    }

    async fn move_task_to_column(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        task_id: TaskId,
        target_column_id: SprintColumnId,
    ) -> SprintboardResult<Sprint> {
        let cmd = MoveTaskToColumn {
            project_id,
            sprint_id,
            task_id,
            target_column_id,
        };
        self.commit(ctx, cmd).await
    }

    async fn sync_sprint_columns(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
    ) -> SprintboardResult<Vec<SprintId>> {
        self.commit(ctx, SyncSprintColumns { project_id }).await
    }

    async fn update_sprint_member_capacity(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        sprint_id: SprintId,
        capacities: Vec<MemberCapacityUpdate>,
    ) -> SprintboardResult<Sprint> {
        let cmd = UpdateMemberCapacity {
            project_id,
            sprint_id,
            capacities,
        };
        self.commit(ctx, cmd).await
    }

    async fn add_time_log(
        &self,
        ctx: &RequestContext,
        project_id: ProjectId,
        submission: NewTimeLog,
    ) -> SprintboardResult<TimeLogOutcome> {
        self.commit(
            ctx,
            AddTimeLog {
                project_id,
                submission,
            },
        )
        .await
    }

    async fn get_sprint(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintDetail> {
        self.read_sprint(project_id, sprint_id, |workspace, project, sprint| {
            Ok(sprint_detail(sprint, &project.active_board, &workspace.tasks))
        })
        .await
    }

    async fn get_sprint_summary(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintSummary> {
        self.read_sprint(project_id, sprint_id, |_, _, sprint| Ok(sprint_summary(sprint)))
            .await
    }

    async fn get_sprint_report(
        &self,
        project_id: ProjectId,
        sprint_id: SprintId,
    ) -> SprintboardResult<SprintReport> {
        self.read_sprint(project_id, sprint_id, |workspace, _, sprint| {
            workspace
                .reports
                .iter()
                .find(|r| r.sprint_id == sprint.id)
                .cloned()
                .ok_or_else(|| {
                    SprintboardError::NotFound(format!("Report for sprint {} not found", sprint.id))
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{LoggingNotifier, MockNotifier};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use sprintboard_core::RejectionCode;
    use sprintboard_domain::{
        Board, BoardColumn, ProjectMember, SprintEvent, SprintStatus, StatusId, Task,
    };
    use sprintboard_persistence::{JsonFileStore, MemoryStore};
    use tempfile::tempdir;
    use uuid::Uuid;

    const HOUR: u64 = 3_600;

    struct Seed {
        workspace: WorkspaceSnapshot,
        project_id: ProjectId,
        statuses: Vec<StatusId>,
        dev: UserId,
        now: DateTime<Utc>,
    }

    impl Seed {
        fn new() -> Self {
            let statuses = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
            let board = Board::new(vec![
                BoardColumn::new(statuses[0], "Todo"),
                BoardColumn::new(statuses[1], "Doing"),
                BoardColumn::new(statuses[2], "Done"),
            ]);
            let mut project = Project::new("Apollo", board);
            let dev = Uuid::new_v4();
            project.members = vec![ProjectMember::new(dev, 40 * HOUR, 8 * HOUR)];
            let project_id = project.id;

            let mut workspace = WorkspaceSnapshot::new();
            workspace.projects.push(project);
            Self {
                workspace,
                project_id,
                statuses,
                dev,
                now: Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap(),
            }
        }

        fn task(&mut self, estimate: u64, status: usize) -> TaskId {
            let mut task = Task::new(self.project_id, "Task", self.statuses[status]);
            task.created_at = self.now - Duration::days(7);
            task.assignee_id = Some(self.dev);
            task.set_estimate(estimate);
            let id = task.id;
            self.workspace.tasks.push(task);
            id
        }

        fn ctx(&self) -> RequestContext {
            RequestContext::new(self.dev).at(self.now)
        }

        fn new_sprint(&self, name: &str) -> NewSprint {
            let start = self.now.date_naive();
            NewSprint {
                name: name.to_string(),
                goal: Some("Ship it".to_string()),
                start_date: Some(start),
                end_date: Some(start + Duration::days(13)),
            }
        }
    }

    async fn engine_with(
        seed: &Seed,
        notifier: Arc<dyn Notifier>,
    ) -> SprintEngine<MemoryStore> {
        let engine = SprintEngine::new(MemoryStore::new(), notifier, EngineConfig::default());
        engine
            .import_workspace(&seed.ctx(), seed.workspace.clone())
            .await
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_close_with_carry_over_notifies_after_commit() {
        let mut seed = Seed::new();
        let done = seed.task(4 * HOUR, 0);
        let doing = seed.task(4 * HOUR, 0);
        let todo = seed.task(4 * HOUR, 0);

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|e| matches!(e, SprintEvent::Published { .. }))
            .times(1)
            .returning(|_| Ok(()));
        notifier
            .expect_notify()
            .withf(|e| matches!(e, SprintEvent::Closed { next_sprint_id: Some(_), .. }))
            .times(1)
            .returning(|_| Ok(()));
        let engine = engine_with(&seed, Arc::new(notifier)).await;
        let ctx = seed.ctx();
        let pid = seed.project_id;

        let sprint = engine
            .create_sprint(&ctx, pid, seed.new_sprint("Sprint 1"))
            .await
            .unwrap();
        for task in [done, doing, todo] {
            engine
                .add_task_to_sprint(&ctx, pid, sprint.id, task, false)
                .await
                .unwrap();
        }
        engine.publish_sprint(&ctx, pid, sprint.id).await.unwrap();

        let detail = engine.get_sprint(pid, sprint.id).await.unwrap();
        let names: Vec<_> = detail.columns.iter().map(|c| c.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                Some("Todo".to_string()),
                Some("Doing".to_string()),
                Some("Done".to_string())
            ]
        );
        engine
            .move_task_to_column(&ctx, pid, sprint.id, done, detail.columns[2].id)
            .await
            .unwrap();
        engine
            .move_task_to_column(&ctx, pid, sprint.id, doing, detail.columns[1].id)
            .await
            .unwrap();

        let options = CloseSprintOptions {
            create_new_sprint: true,
            new_sprint: Some(seed.new_sprint("Sprint 2")),
            create_and_publish: false,
        };
        let outcome = engine
            .close_sprint(&ctx, pid, sprint.id, options)
            .await
            .unwrap();
        assert_eq!(outcome.finished, vec![done]);
        assert_eq!(outcome.unfinished.len(), 2);

        let closed = engine.get_sprint_summary(pid, sprint.id).await.unwrap();
        assert_eq!(closed.status, Some(SprintStatus::Closed));

        let new_id = outcome.new_sprint_id.unwrap();
        let next = engine.get_sprint(pid, new_id).await.unwrap();
        assert_eq!(next.summary.task_count, 2);
        assert_eq!(next.columns[0].tasks[0].task_id, todo);
        assert_eq!(next.columns[1].tasks[0].task_id, doing);

        let workspace = engine.export_workspace().await.unwrap();
        let finished = workspace.tasks.iter().find(|t| t.id == done).unwrap();
        assert!(finished.sprint_id.is_none());

        let report = engine.get_sprint_report(pid, sprint.id).await.unwrap();
        assert!(report.is_finalized());
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_roll_back() {
        let mut seed = Seed::new();
        let task = seed.task(4 * HOUR, 0);

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(SprintboardError::Internal("relay down".into())));
        let engine = engine_with(&seed, Arc::new(notifier)).await;
        let ctx = seed.ctx();

        let sprint = engine
            .create_sprint(&ctx, seed.project_id, seed.new_sprint("Sprint 1"))
            .await
            .unwrap();
        engine
            .add_task_to_sprint(&ctx, seed.project_id, sprint.id, task, false)
            .await
            .unwrap();
        let published = engine
            .publish_sprint(&ctx, seed.project_id, sprint.id)
            .await
            .unwrap();
        assert_eq!(published.status, Some(SprintStatus::InProgress));

        let workspace = engine.export_workspace().await.unwrap();
        assert_eq!(workspace.projects[0].sprint_id, Some(sprint.id));
    }

    #[tokio::test]
    async fn test_rejected_command_commits_nothing() {
        let mut seed = Seed::new();
        let big = seed.task(41 * HOUR, 0);
        let engine = engine_with(&seed, Arc::new(LoggingNotifier)).await;
        let ctx = seed.ctx();
        let revision_before = engine.store().revision();

        let sprint = engine
            .create_sprint(&ctx, seed.project_id, seed.new_sprint("Sprint 1"))
            .await
            .unwrap();
        let err = engine
            .add_task_to_sprint(&ctx, seed.project_id, sprint.id, big, false)
            .await
            .unwrap_err();
        assert_eq!(
            err.rejection().map(|r| r.code),
            Some(RejectionCode::SprintCapacityExceeded)
        );
        assert_eq!(engine.store().revision(), revision_before + 1);

        let summary = engine
            .get_sprint_summary(seed.project_id, sprint.id)
            .await
            .unwrap();
        assert_eq!(summary.total_estimation, 0);
        assert_eq!(summary.task_count, 0);

        engine
            .add_task_to_sprint(&ctx, seed.project_id, sprint.id, big, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_time_log_progress_figures() {
        let mut seed = Seed::new();
        let task = seed.task(10 * HOUR, 0);
        let engine = engine_with(&seed, Arc::new(LoggingNotifier)).await;
        let ctx = seed.ctx();

        let log = |logged, remaining| NewTimeLog {
            task_id: task,
            logged_time: logged,
            remaining_time: Some(remaining),
            description: "work".to_string(),
            start_date: Some(seed.now - Duration::days(2)),
            ..NewTimeLog::default()
        };

        let half = engine
            .add_time_log(&ctx, seed.project_id, log(5 * HOUR, 5 * HOUR))
            .await
            .unwrap();
        assert_eq!(half.task.progress, 50.0);
        assert_eq!(half.task.over_logged_time, 0);

        let start = seed.now - Duration::days(1);
        let over = engine
            .add_time_log(
                &ctx,
                seed.project_id,
                NewTimeLog {
                    start_date: Some(start),
                    ..log(7 * HOUR, 0)
                },
            )
            .await
            .unwrap();
        assert_eq!(over.task.progress, 100.0);
        assert_eq!(over.task.remaining_time, 0);
        assert_eq!(over.task.over_logged_time, 2 * HOUR);
        assert_eq!(over.task.over_progress, 20.0);
    }

    #[tokio::test]
    async fn test_unknown_sprint_is_not_found() {
        let seed = Seed::new();
        let engine = engine_with(&seed, Arc::new(LoggingNotifier)).await;
        let result = engine.get_sprint(seed.project_id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(SprintboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_engines_sharing_a_file_see_each_other() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let seed = Seed::new();

        let first = SprintEngine::new(
            JsonFileStore::new(&path),
            Arc::new(LoggingNotifier),
            EngineConfig::default(),
        );
        let second = SprintEngine::new(
            JsonFileStore::new(&path),
            Arc::new(LoggingNotifier),
            EngineConfig::default(),
        );
        first
            .import_workspace(&seed.ctx(), seed.workspace.clone())
            .await
            .unwrap();

        let sprint = second
            .create_sprint(&seed.ctx(), seed.project_id, seed.new_sprint("Shared"))
            .await
            .unwrap();
        let seen = first
            .get_sprint_summary(seed.project_id, sprint.id)
            .await
            .unwrap();
        assert_eq!(seen.name, "Shared");
        assert_eq!(
            seen.start_date,
            NaiveDate::from_ymd_opt(2030, 3, 4).unwrap()
        );
    }
}
