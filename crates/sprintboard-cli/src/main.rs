mod cli;
mod context;
mod handlers;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;

fn init_tracing() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("SPRINTBOARD_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::open(&cli.file, cli.actor, cli.locale);

    match cli.command {
        Commands::Sprint(sprint_cmd) => handlers::sprint::handle(&ctx, sprint_cmd.action).await,
        Commands::TimeLog(time_log_cmd) => {
            handlers::time_log::handle(&ctx, time_log_cmd.action).await
        }
        Commands::Export => handlers::export::handle_export(&ctx).await,
        Commands::Import(args) => handlers::export::handle_import(&ctx, args).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::output_error(&e);
    }
    Ok(())
}
