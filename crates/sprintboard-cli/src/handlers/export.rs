use sprintboard_domain::WorkspaceSnapshot;

use crate::cli::ImportArgs;
use crate::context::CliContext;
use crate::output;

pub async fn handle_export(ctx: &CliContext) -> anyhow::Result<()> {
    let workspace = ctx.engine.export_workspace().await?;
    println!("{}", serde_json::to_string_pretty(&workspace)?);
    Ok(())
}

pub async fn handle_import(ctx: &CliContext, args: ImportArgs) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", args.input, e))?;
    let workspace: WorkspaceSnapshot = serde_json::from_str(&data)
        .map_err(|e| anyhow::anyhow!("Invalid workspace file {}: {}", args.input, e))?;

    let projects = workspace.projects.len();
    let tasks = workspace.tasks.len();
    let revision = ctx
        .engine
        .import_workspace(&ctx.request()?, workspace)
        .await?;
    output::output_success(serde_json::json!({
        "revision": revision,
        "projects": projects,
        "tasks": tasks,
    }));
    Ok(())
}
