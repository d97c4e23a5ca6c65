use chrono::{NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sprintboard")]
#[command(about = "Sprint lifecycle and capacity engine", long_about = None)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")")
)]
pub struct Cli {
    /// Path to the workspace file (or set SPRINTBOARD_FILE env var)
    #[arg(long, value_name = "FILE", env = "SPRINTBOARD_FILE")]
    pub file: String,

    /// User performing the operation (or set SPRINTBOARD_ACTOR env var)
    #[arg(long, value_name = "USER_ID", env = "SPRINTBOARD_ACTOR")]
    pub actor: Option<Uuid>,

    /// Locale for rendered notifications
    #[arg(long)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sprint operations
    Sprint(SprintCommand),
    /// Time logging
    TimeLog(TimeLogCommand),
    /// Print the whole workspace as JSON
    Export,
    /// Replace the workspace with the contents of a JSON file
    Import(ImportArgs),
}

// Sprint commands
#[derive(Args)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a new draft sprint
    Create(SprintCreateArgs),
    /// Get a sprint's board view, or only its summary
    Get {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        summary: bool,
    },
    /// Edit a draft sprint
    Update(SprintUpdateArgs),
    /// Start a draft sprint
    Publish {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
    /// Close an in-progress sprint
    Close(SprintCloseArgs),
    /// Add a backlog task to a sprint
    AddTask {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        task_id: Uuid,
        /// Skip the capacity checks
        #[arg(long)]
        adjust_hours_allowed: bool,
    },
    /// Send a task back to the backlog
    RemoveTask {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        task_id: Uuid,
    },
    /// Move a task to another column of the sprint
    MoveTask {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        task_id: Uuid,
        #[arg(long)]
        column_id: Uuid,
    },
    /// Change one member's capacity in a draft sprint
    Capacity(SprintCapacityArgs),
    /// Realign open sprints with the project's board
    SyncColumns {
        #[arg(long)]
        project_id: Uuid,
    },
    /// Get the sprint report
    Report {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct SprintCreateArgs {
    #[arg(long)]
    pub project_id: Uuid,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct SprintUpdateArgs {
    #[arg(long)]
    pub project_id: Uuid,
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct SprintCloseArgs {
    #[arg(long)]
    pub project_id: Uuid,
    #[arg(long)]
    pub id: Uuid,
    /// Carry unfinished tasks into a new sprint
    #[arg(long)]
    pub create_new_sprint: bool,
    #[arg(long, requires = "create_new_sprint")]
    pub new_name: Option<String>,
    #[arg(long, requires = "create_new_sprint")]
    pub new_goal: Option<String>,
    #[arg(long, requires = "create_new_sprint")]
    pub new_start_date: Option<NaiveDate>,
    #[arg(long, requires = "create_new_sprint")]
    pub new_end_date: Option<NaiveDate>,
    /// Publish the new sprint right away
    #[arg(long, requires = "create_new_sprint")]
    pub publish_new: bool,
}

#[derive(Args)]
pub struct SprintCapacityArgs {
    #[arg(long)]
    pub project_id: Uuid,
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub user_id: Uuid,
    /// Sprint capacity, e.g. "1w" or "32h"
    #[arg(long)]
    pub capacity: String,
    /// Daily logging limit, e.g. "8h"
    #[arg(long)]
    pub per_day: String,
    /// Selected working days, e.g. "mon,tue,wed"
    #[arg(long, value_delimiter = ',')]
    pub working_days: Option<Vec<Weekday>>,
}

// Time-log commands
#[derive(Args)]
pub struct TimeLogCommand {
    #[command(subcommand)]
    pub action: TimeLogAction,
}

#[derive(Subcommand)]
pub enum TimeLogAction {
    /// Log time against a task
    Add(TimeLogAddArgs),
}

#[derive(Args)]
pub struct TimeLogAddArgs {
    #[arg(long)]
    pub project_id: Uuid,
    #[arg(long)]
    pub task_id: Uuid,
    /// Logged duration, e.g. "2h 30m"
    #[arg(long)]
    pub logged: String,
    /// Remaining estimate after this log
    #[arg(long)]
    pub remaining: String,
    #[arg(long)]
    pub description: String,
    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub start: String,
    /// End of a period log; YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub end: Option<String>,
}

// Import command
#[derive(Args)]
pub struct ImportArgs {
    /// JSON workspace file to load
    #[arg(long)]
    pub input: String,
}
