use chrono::{DateTime, NaiveDate, Utc};
use sprintboard_core::{format_duration, parse_duration};
use sprintboard_domain::{NewTimeLog, SprintOperations};

use crate::cli::{TimeLogAction, TimeLogAddArgs};
use crate::context::CliContext;
use crate::output;

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| ())
                .and_then(|d| d.and_hms_opt(0, 0, 0).ok_or(()))
                .map(|dt| dt.and_utc())
        })
        .map_err(|_| {
            format!(
                "Invalid date '{}'. Supported formats: YYYY-MM-DD or RFC 3339 (e.g., 2030-01-15T10:30:00Z)",
                s
            )
        })
}

pub async fn handle(ctx: &CliContext, action: TimeLogAction) -> anyhow::Result<()> {
    match action {
        TimeLogAction::Add(args) => handle_add(ctx, args).await,
    }
}

async fn handle_add(ctx: &CliContext, args: TimeLogAddArgs) -> anyhow::Result<()> {
    let config = ctx.config();
    let end_date = args
        .end
        .as_deref()
        .map(parse_datetime)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let submission = NewTimeLog {
        task_id: args.task_id,
        logged_time: parse_duration(&args.logged, config)?,
        remaining_time: Some(parse_duration(&args.remaining, config)?),
        description: args.description,
        start_date: Some(parse_datetime(&args.start).map_err(anyhow::Error::msg)?),
        is_period: end_date.is_some(),
        end_date,
    };

    let outcome = ctx
        .engine
        .add_time_log(&ctx.request()?, args.project_id, submission)
        .await?;
    let logged = format_duration(outcome.time_log.logged_time, config);
    let task_total_logged = format_duration(outcome.task.total_logged_time, config);
    output::output_success(serde_json::json!({
        "time_log": outcome.time_log,
        "task": outcome.task,
        "logged": logged,
        "task_total_logged": task_total_logged,
    }));
    Ok(())
}
