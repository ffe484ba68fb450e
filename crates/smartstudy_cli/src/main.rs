//! `smartstudy` command-line host.
//!
//! # Responsibility
//! - Wire config, logging and the database into the core services.
//! - Print service messages the way a UI host would show them.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, TimeZone};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rusqlite::Connection;
use smartstudy_core::clock::{format_date, now_epoch_ms};
use smartstudy_core::db::open_db;
use smartstudy_core::service::task_service::completion_message;
use smartstudy_core::{
    format_hms, init_logging, ChangeFeed, CoreConfig, DashboardSnapshot, Priority, Session,
    SessionService, SqliteSessionRepository, SqliteSubjectRepository, SqliteTaskRepository,
    SubjectDetail, SubjectDraft, SubjectId, SubjectRef, SubjectRepository, SubjectScope,
    SubjectService, Table, Task, TaskDraft, TaskId, TaskService, TimerService, ToUserMessage,
};
use std::path::PathBuf;
use std::thread;

#[derive(Parser)]
#[command(name = "smartstudy")]
#[command(about = "Track study subjects, tasks and timed sessions", long_about = None)]
struct Cli {
    /// JSON config file. SMARTSTUDY_* environment variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommand,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },
    /// Record and inspect study sessions
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },
    /// Run a live timer for a subject and store the result as a session
    Timer {
        subject_id: SubjectId,
        /// Number of timer ticks to run before finishing
        seconds: u64,
    },
    /// Show the dashboard, or one subject's detail
    Dashboard {
        #[arg(short, long)]
        subject: Option<SubjectId>,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    Add {
        name: String,
        goal_hours: String,
        /// Palette seed. Defaults to the current subject count.
        #[arg(long)]
        seed: Option<u64>,
    },
    List,
    /// Delete a subject with all of its tasks and sessions
    Delete { id: SubjectId },
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        subject_id: SubjectId,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        /// Due date (YYYY-MM-DD). Defaults to now.
        #[arg(long)]
        due: Option<String>,
    },
    List {
        #[arg(short, long)]
        subject: Option<SubjectId>,
        /// Show completed tasks instead of upcoming ones
        #[arg(long)]
        completed: bool,
    },
    Toggle { id: TaskId },
    Delete { id: TaskId },
}

#[derive(Subcommand)]
enum SessionCommand {
    Record {
        subject_id: SubjectId,
        duration_secs: i64,
    },
    List {
        #[arg(short, long)]
        subject: Option<SubjectId>,
        /// List every session instead of the most recent ones
        #[arg(long)]
        all: bool,
    },
    Delete { id: i64 },
    Total {
        #[arg(short, long)]
        subject: Option<SubjectId>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CoreConfig::load(cli.config.as_deref())?;

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }
    info!("event=cli_start module=cli status=ok");

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;

    match cli.command {
        Commands::Subject { action } => run_subject(&conn, action),
        Commands::Task { action } => run_task(&conn, action),
        Commands::Session { action } => run_session(&conn, action),
        Commands::Timer {
            subject_id,
            seconds,
        } => run_timer(&conn, &config, subject_id, seconds),
        Commands::Dashboard { subject } => run_dashboard(&conn, subject),
    }
}

fn run_subject(conn: &Connection, action: SubjectCommand) -> Result<()> {
    let service = SubjectService::new(SqliteSubjectRepository::try_new(conn)?);
    match action {
        SubjectCommand::Add {
            name,
            goal_hours,
            seed,
        } => {
            let seed = match seed {
                Some(seed) => seed,
                None => u64::from(service.subject_count()?),
            };
            let subject = service
                .create_subject(SubjectDraft {
                    name,
                    goal_hours,
                    colors: service.next_palette(seed),
                })
                .map_err(user_error)?;
            println!(
                "Subject saved successfully (id={})",
                subject.id.unwrap_or_default()
            );
        }
        SubjectCommand::List => {
            for subject in service.list_subjects()? {
                println!(
                    "{:>4}  {:<20}  goal {}h",
                    subject.id.unwrap_or_default(),
                    subject.name,
                    subject.goal_hours
                );
            }
        }
        SubjectCommand::Delete { id } => {
            let report = service.delete_subject(id).map_err(user_error)?;
            println!(
                "Subject deleted ({} tasks, {} sessions removed)",
                report.tasks_deleted, report.sessions_deleted
            );
        }
    }
    Ok(())
}

fn run_task(conn: &Connection, action: TaskCommand) -> Result<()> {
    let service = TaskService::new(SqliteTaskRepository::try_new(conn)?);
    match action {
        TaskCommand::Add {
            subject_id,
            title,
            description,
            priority,
            due,
        } => {
            let due_date = due.as_deref().map(parse_due_date).transpose()?;
            let task = service
                .save_task(
                    TaskDraft {
                        subject: Some(lookup_subject(conn, subject_id)?),
                        title,
                        description,
                        priority: priority.into(),
                        due_date,
                        ..TaskDraft::default()
                    },
                    now_epoch_ms(),
                )
                .map_err(user_error)?;
            println!("Task saved successfully (id={})", task.id.unwrap_or_default());
        }
        TaskCommand::List { subject, completed } => {
            let scope = scope_for(subject);
            let tasks = if completed {
                service.completed_tasks(scope)?
            } else {
                service.upcoming_tasks(scope)?
            };
            tasks.iter().for_each(print_task);
        }
        TaskCommand::Toggle { id } => {
            let task = service.toggle_completion(id).map_err(user_error)?;
            println!("{}", completion_message(&task).text);
        }
        TaskCommand::Delete { id } => {
            println!("{}", service.delete_task(id).map_err(user_error)?.text);
        }
    }
    Ok(())
}

fn run_session(conn: &Connection, action: SessionCommand) -> Result<()> {
    let service = SessionService::new(SqliteSessionRepository::try_new(conn)?);
    match action {
        SessionCommand::Record {
            subject_id,
            duration_secs,
        } => {
            let subject = lookup_subject(conn, subject_id)?;
            let outcome = service
                .save_session(Some(&subject), duration_secs, now_epoch_ms())
                .map_err(user_error)?;
            println!("{}", outcome.message().text);
        }
        SessionCommand::List { subject, all } => {
            let scope = scope_for(subject);
            let sessions = if all {
                service.all_sessions(scope)?
            } else {
                service.recent_sessions(scope)?
            };
            sessions.iter().for_each(print_session);
        }
        SessionCommand::Delete { id } => {
            println!("{}", service.delete_session(id).map_err(user_error)?.text);
        }
        SessionCommand::Total { subject } => {
            let scope = scope_for(subject);
            let total = service.total_duration(scope)?;
            println!(
                "{} ({:.2} h)",
                format_hms(u64::try_from(total).unwrap_or_default()),
                service.studied_hours(scope)?
            );
        }
    }
    Ok(())
}

fn run_timer(
    conn: &Connection,
    config: &CoreConfig,
    subject_id: SubjectId,
    seconds: u64,
) -> Result<()> {
    let subject = lookup_subject(conn, subject_id)?;
    let feed = ChangeFeed::new();
    let changes = feed.subscribe();
    let sessions = SessionService::new(SqliteSessionRepository::try_new(conn)?).with_feed(feed);
    let timer = TimerService::spawn_with_tick(config.tick())?;
    let handle = timer.handle();

    handle.start()?;
    let poll = config.tick() / 4;
    let mut shown = 0;
    loop {
        let snapshot = handle.snapshot();
        if snapshot.elapsed_secs != shown {
            shown = snapshot.elapsed_secs;
            println!("{}", snapshot.formatted());
        }
        if shown >= seconds {
            break;
        }
        thread::sleep(poll);
    }

    let outcome = sessions
        .finish_timer(&handle, Some(&subject))
        .map_err(user_error)?;
    timer.shutdown();
    println!("{}", outcome.message().text);

    if changes.touched_any(&[Table::Sessions]) {
        if let Some(detail) = SubjectDetail::load(conn, subject_id)? {
            print_progress(&detail);
        }
    }
    Ok(())
}

fn run_dashboard(conn: &Connection, subject: Option<SubjectId>) -> Result<()> {
    if let Some(id) = subject {
        let detail =
            SubjectDetail::load(conn, id)?.ok_or_else(|| anyhow!("Subject not found: {id}"))?;
        print_progress(&detail);
        println!("Upcoming tasks");
        detail.upcoming_tasks.iter().for_each(print_task);
        println!("Completed tasks");
        detail.completed_tasks.iter().for_each(print_task);
        println!("Recent sessions");
        detail.recent_sessions.iter().for_each(print_session);
        return Ok(());
    }

    let snapshot = DashboardSnapshot::load(conn)?;
    println!(
        "{} subjects, {:.2} of {} goal hours studied",
        snapshot.subject_count, snapshot.total_studied_hours, snapshot.total_goal_hours
    );
    println!("Upcoming tasks");
    snapshot.upcoming_tasks.iter().for_each(print_task);
    println!("Recent sessions");
    snapshot.recent_sessions.iter().for_each(print_session);
    Ok(())
}

fn lookup_subject(conn: &Connection, id: SubjectId) -> Result<SubjectRef> {
    SqliteSubjectRepository::try_new(conn)?
        .get_subject(id)?
        .and_then(|subject| subject.subject_ref())
        .ok_or_else(|| anyhow!("Subject not found: {id}"))
}

fn scope_for(subject: Option<SubjectId>) -> SubjectScope {
    subject.map_or(SubjectScope::All, SubjectScope::Subject)
}

/// Local midnight of `value` as epoch millis.
fn parse_due_date(value: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow!("Invalid date format. Use YYYY-MM-DD: {e}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid date `{value}`"))?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| anyhow!("date `{value}` does not exist in the local timezone"))
}

fn user_error<E: ToUserMessage>(err: E) -> anyhow::Error {
    anyhow!(err.to_user_message().text)
}

fn print_progress(detail: &SubjectDetail) {
    println!(
        "{}: {:.2} of {} h ({:.0}%)",
        detail.subject.name,
        detail.studied_hours,
        detail.subject.goal_hours,
        detail.progress * 100.0
    );
}

fn print_task(task: &Task) {
    println!(
        "{:>4}  [{}] {:<30}  {:<20}  {:<6}  due {}",
        task.id.unwrap_or_default(),
        if task.is_completed { "x" } else { " " },
        task.title,
        task.subject_name,
        task.priority.title(),
        format_date(task.due_date)
    );
}

fn print_session(session: &Session) {
    println!(
        "{:>4}  {:<20}  {}  {}",
        session.id.unwrap_or_default(),
        session.subject_name,
        format_hms(u64::try_from(session.duration_secs).unwrap_or_default()),
        format_date(session.date)
    );
}
