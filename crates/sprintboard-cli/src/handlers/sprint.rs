use sprintboard_core::parse_duration;
use sprintboard_domain::{
    CloseSprintOptions, MemberCapacityUpdate, NewSprint, SprintOperations,
    SprintUpdate, WorkingDay,
};

use crate::cli::{SprintAction, SprintCapacityArgs, SprintCloseArgs, SprintUpdateArgs};
use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &CliContext, action: SprintAction) -> anyhow::Result<()> {
    let engine = &ctx.engine;
    match action {
        SprintAction::Create(args) => {
            let new_sprint = NewSprint {
                name: args.name,
                goal: args.goal,
                start_date: args.start_date,
                end_date: args.end_date,
            };
            let sprint = engine
                .create_sprint(&ctx.request()?, args.project_id, new_sprint)
                .await?;
            output::output_success(&sprint);
        }
        SprintAction::Get {
            project_id,
            id,
            summary,
        } => {
            if summary {
                output::output_success(engine.get_sprint_summary(project_id, id).await?);
            } else {
                output::output_success(engine.get_sprint(project_id, id).await?);
            }
        }
        SprintAction::Update(args) => handle_update(ctx, args).await?,
        SprintAction::Publish { project_id, id } => {
            let sprint = engine
                .publish_sprint(&ctx.request()?, project_id, id)
                .await?;
            output::output_success(&sprint);
        }
        SprintAction::Close(args) => handle_close(ctx, args).await?,
        SprintAction::AddTask {
            project_id,
            id,
            task_id,
            adjust_hours_allowed,
        } => {
            let sprint = engine
                .add_task_to_sprint(
                    &ctx.request()?,
                    project_id,
                    id,
                    task_id,
                    adjust_hours_allowed,
                )
                .await?;
            output::output_success(&sprint);
        }
        SprintAction::RemoveTask {
            project_id,
            id,
            task_id,
        } => {
            let sprint = engine
                .remove_task_from_sprint(&ctx.request()?, project_id, id, task_id)
                .await?;
            output::output_success(&sprint);
        }
        SprintAction::MoveTask {
            project_id,
            id,
            task_id,
            column_id,
        } => {
            let sprint = engine
                .move_task_to_column(&ctx.request()?, project_id, id, task_id, column_id)
                .await?;
            output::output_success(&sprint);
        }
        SprintAction::Capacity(args) => handle_capacity(ctx, args).await?,
        SprintAction::SyncColumns { project_id } => {
            let changed = engine
                .sync_sprint_columns(&ctx.request()?, project_id)
                .await?;
            output::output_success(serde_json::json!({ "changed_sprints": changed }));
        }
        SprintAction::Report { project_id, id } => {
            output::output_success(engine.get_sprint_report(project_id, id).await?);
        }
    }
    Ok(())
}

async fn handle_update(ctx: &CliContext, args: SprintUpdateArgs) -> anyhow::Result<()> {
    let updates = SprintUpdate {
        name: args.name,
        goal: args.goal,
        start_date: args.start_date,
        end_date: args.end_date,
    };
    let sprint = ctx
        .engine
        .update_sprint(&ctx.request()?, args.project_id, args.id, updates)
        .await?;
    output::output_success(&sprint);
    Ok(())
}

async fn handle_close(ctx: &CliContext, args: SprintCloseArgs) -> anyhow::Result<()> {
    let new_sprint = args.new_name.map(|name| NewSprint {
        name,
        goal: args.new_goal,
        start_date: args.new_start_date,
        end_date: args.new_end_date,
    });
    let options = CloseSprintOptions {
        create_new_sprint: args.create_new_sprint,
        new_sprint,
        create_and_publish: args.publish_new,
    };
    let outcome = ctx
        .engine
        .close_sprint(&ctx.request()?, args.project_id, args.id, options)
        .await?;
    output::output_success(&outcome);
    Ok(())
}

async fn handle_capacity(ctx: &CliContext, args: SprintCapacityArgs) -> anyhow::Result<()> {
    let config = ctx.config();
    let update = MemberCapacityUpdate {
        user_id: args.user_id,
        working_capacity: parse_duration(&args.capacity, config)?,
        working_capacity_per_day: parse_duration(&args.per_day, config)?,
        working_days: match args.working_days {
            Some(days) => WorkingDay::week_with(&days),
            None => WorkingDay::default_week(),
        },
    };
    let sprint = ctx
        .engine
        .update_sprint_member_capacity(&ctx.request()?, args.project_id, args.id, vec![update])
        .await?;
    output::output_success(&sprint);
    Ok(())
}
