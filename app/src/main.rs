//! `staffdesk`: command-line front end to the StaffDesk client.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use staffdesk::entities::{EntityId, LeaveCounts, Role, Stage, TaskCounts, TaskStatus};
use staffdesk::hooks::Attachment;
use staffdesk::{App, AppConfig, Resource, ResourceHook};
use staffdesk_runtime::metrics::MetricsRecorder;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "StaffDesk HR/CRM client", long_about = None)]
struct Cli {
    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "STAFFDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Leave requests
    #[command(subcommand)]
    Leaves(LeaveCommand),
    /// Attendance
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    /// User administration
    #[command(subcommand)]
    Users(UserCommand),
    /// Onboarding pipeline
    #[command(subcommand)]
    Onboarding(OnboardingCommand),
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks
    List {
        /// Only tasks assigned to me
        #[arg(long)]
        assigned: bool,
    },
    /// Create a task
    Create(NewTask),
    /// Change a task's status
    Status {
        /// Task ID
        id: String,
        /// New status, e.g. "In Progress"
        status: TaskStatus,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

#[derive(Args)]
struct NewTask {
    /// Title
    #[arg(long)]
    title: String,
    /// Description
    #[arg(long)]
    description: Option<String>,
    /// Priority label
    #[arg(long)]
    priority: Option<String>,
    /// Assignee user ID
    #[arg(long)]
    assignee: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    due: Option<String>,
}

#[derive(Subcommand)]
enum LeaveCommand {
    /// List all leave requests
    List,
    /// List my leave requests with tab counts
    Mine,
    /// Approve a request
    Approve {
        /// Leave ID
        id: String,
    },
    /// Reject a request
    Reject {
        /// Leave ID
        id: String,
    },
}

#[derive(Subcommand)]
enum AttendanceCommand {
    /// List attendance records
    List {
        /// Only my records
        #[arg(long)]
        mine: bool,
    },
    /// Check in for today
    CheckIn,
    /// Check out for today
    CheckOut,
}

#[derive(Subcommand)]
enum UserCommand {
    /// List users
    List,
    /// Change a user's role
    Role {
        /// User ID
        id: String,
        /// New role
        role: Role,
    },
}

#[derive(Subcommand)]
enum OnboardingCommand {
    /// List candidates
    List,
    /// Add a candidate
    Create(NewCandidate),
    /// Move a candidate to another stage
    Stage {
        /// Candidate ID
        id: String,
        /// New stage
        stage: Stage,
    },
}

#[derive(Args)]
struct NewCandidate {
    /// Full name
    #[arg(long)]
    name: String,
    /// Email
    #[arg(long)]
    email: String,
    /// Phone
    #[arg(long)]
    phone: Option<String>,
    /// Position applied for
    #[arg(long)]
    position: Option<String>,
    /// Document to upload as FIELD=PATH, e.g. resume=./cv.pdf
    #[arg(long = "document", value_parser = parse_document)]
    documents: Vec<(String, PathBuf)>,
}

fn parse_document(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((field, path)) if !field.is_empty() && !path.is_empty() => {
            Ok((field.to_string(), PathBuf::from(path)))
        },
        _ => Err(format!("expected FIELD=PATH, got `{raw}`")),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("staffdesk=info,staffdesk_client=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let recorder = if cli.metrics {
        Some(MetricsRecorder::install().context("installing metrics recorder")?)
    } else {
        None
    };

    let config = AppConfig::from_env().context("loading configuration")?;
    let app = App::bootstrap(config).await.context("starting client")?;

    let succeeded = run(&app, cli.command).await?;

    for toast in app.toasts().await {
        println!("[{}] {}", toast.kind, toast.message);
    }
    if let Some(recorder) = recorder.and_then(|r| r.render()) {
        println!("{recorder}");
    }

    // Pending toast dismissals are not worth waiting for; snapshot writes
    // finish well within the grace period.
    if let Err(e) = app.shutdown(Duration::from_millis(250)).await {
        tracing::debug!(error = %e, "Exiting with effects still pending");
    }

    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

async fn run(app: &App, command: Commands) -> Result<bool> {
    let hooks = app.hooks();

    let succeeded = match command {
        Commands::Login { email, password } => {
            let user = hooks.auth.login(&email, &password).await?;
            if let Some(user) = &user {
                println!("Signed in as {} <{}> ({})", user.name, user.email, user.role);
            }
            user.is_some()
        },
        Commands::Logout => {
            hooks.auth.logout().await?;
            true
        },
        Commands::Whoami => {
            if !hooks.auth.snapshot().await.is_authenticated {
                println!("Not signed in");
                return Ok(false);
            }
            let user = hooks.auth.fetch_profile().await?;
            if let Some(user) = &user {
                println!("{} <{}>", user.name, user.email);
                println!("  Role: {}", user.role);
                if let Some(department) = &user.department {
                    println!("  Department: {department}");
                }
            }
            user.is_some()
        },
        Commands::Tasks(command) => run_tasks(&hooks.tasks, command).await?,
        Commands::Leaves(command) => run_leaves(&hooks.leaves, command).await?,
        Commands::Attendance(command) => match command {
            AttendanceCommand::List { mine } => {
                let fetched = if mine {
                    hooks.attendance.fetch_mine().await?
                } else {
                    hooks.attendance.fetch_all().await?
                };
                if fetched {
                    for record in hooks.attendance.snapshot().await.items {
                        let out = record
                            .check_out
                            .map_or_else(|| "open".to_string(), |t| t.format("%H:%M").to_string());
                        let check_in = record
                            .check_in
                            .map_or_else(|| "-".to_string(), |t| t.format("%H:%M").to_string());
                        println!(
                            "  {} | {} | {} | {check_in} - {out}",
                            record.id,
                            record.date.as_deref().unwrap_or("-"),
                            record.status
                        );
                    }
                    let summary = hooks.attendance.summary().await;
                    println!(
                        "Present {} | Late {} | Half day {} | Absent {} | Open {}",
                        summary.present, summary.late, summary.half_day, summary.absent, summary.open
                    );
                }
                fetched
            },
            AttendanceCommand::CheckIn => hooks.attendance.check_in().await?.is_some(),
            AttendanceCommand::CheckOut => hooks.attendance.check_out().await?.is_some(),
        },
        Commands::Users(command) => match command {
            UserCommand::List => {
                let fetched = hooks.users.fetch_all().await?;
                if fetched {
                    for user in hooks.users.snapshot().await.items {
                        println!("  {} | {} | {} | {}", user.id, user.name, user.email, user.role);
                    }
                }
                fetched
            },
            UserCommand::Role { id, role } => hooks.users.set_role(&EntityId::new(id), role).await?.is_some(),
        },
        Commands::Onboarding(command) => match command {
            OnboardingCommand::List => {
                let fetched = hooks.onboarding.fetch_all().await?;
                if fetched {
                    for candidate in hooks.onboarding.snapshot().await.items {
                        println!(
                            "  {} | {} | {} | {}",
                            candidate.id,
                            candidate.name,
                            candidate.position.as_deref().unwrap_or("-"),
                            candidate.stage
                        );
                    }
                }
                fetched
            },
            OnboardingCommand::Create(candidate) => {
                let mut attachments = Vec::with_capacity(candidate.documents.len());
                for (field, path) in &candidate.documents {
                    attachments.push(
                        Attachment::read(field.clone(), path)
                            .await
                            .with_context(|| format!("reading {}", path.display()))?,
                    );
                }

                let mut fields = Map::new();
                fields.insert("name".to_string(), Value::String(candidate.name));
                fields.insert("email".to_string(), Value::String(candidate.email));
                insert_opt(&mut fields, "phone", candidate.phone);
                insert_opt(&mut fields, "position", candidate.position);

                if attachments.is_empty() {
                    hooks.onboarding.create(fields).await?.is_some()
                } else {
                    hooks
                        .onboarding
                        .create_with_documents(fields, attachments)
                        .await?
                        .is_some()
                }
            },
            OnboardingCommand::Stage { id, stage } => {
                hooks.onboarding.set_stage(&EntityId::new(id), stage).await?.is_some()
            },
        },
    };

    Ok(succeeded)
}

async fn run_tasks(tasks: &ResourceHook<staffdesk::entities::Task>, command: TaskCommand) -> Result<bool> {
    Ok(match command {
        TaskCommand::List { assigned } => {
            let fetched = if assigned {
                tasks.fetch_assigned().await?
            } else {
                tasks.fetch_all().await?
            };
            if fetched {
                let items = tasks.snapshot().await.items;
                for task in &items {
                    println!(
                        "  {} | {} | {} | {}",
                        task.id,
                        task.status,
                        task.priority.as_deref().unwrap_or("-"),
                        task.title
                    );
                }
                let counts = TaskCounts::tally(&items);
                println!(
                    "Pending {} | In progress {} | Completed {} | Total {}",
                    counts.pending, counts.in_progress, counts.completed, counts.total
                );
            }
            fetched
        },
        TaskCommand::Create(task) => {
            let mut fields = Map::new();
            fields.insert("title".to_string(), Value::String(task.title));
            fields.insert("status".to_string(), Value::String(TaskStatus::Pending.to_string()));
            insert_opt(&mut fields, "description", task.description);
            insert_opt(&mut fields, "priority", task.priority);
            insert_opt(&mut fields, "assignedTo", task.assignee);
            insert_opt(&mut fields, "dueDate", task.due);

            let created = tasks.create(fields).await?;
            if let Some(task) = &created {
                println!("Created {} {}", staffdesk::entities::Task::LABEL, task.id);
            }
            created.is_some()
        },
        TaskCommand::Status { id, status } => tasks.set_status(&EntityId::new(id), status).await?.is_some(),
        TaskCommand::Delete { id } => tasks.remove(&EntityId::new(id)).await?,
    })
}

async fn run_leaves(leaves: &ResourceHook<staffdesk::entities::Leave>, command: LeaveCommand) -> Result<bool> {
    let counts = match command {
        LeaveCommand::List => {
            if !leaves.fetch_all().await? {
                return Ok(false);
            }
            leaves.counts().await
        },
        LeaveCommand::Mine => match leaves.fetch_mine().await? {
            Some(counts) => counts,
            None => return Ok(false),
        },
        LeaveCommand::Approve { id } => return Ok(leaves.approve(&EntityId::new(id)).await?.is_some()),
        LeaveCommand::Reject { id } => return Ok(leaves.reject(&EntityId::new(id)).await?.is_some()),
    };

    for leave in leaves.snapshot().await.items {
        println!(
            "  {} | {} | {} to {} | {}",
            leave.id,
            leave.leave_type.as_deref().unwrap_or("-"),
            leave.start_date.as_deref().unwrap_or("?"),
            leave.end_date.as_deref().unwrap_or("?"),
            leave.status
        );
    }
    print_leave_counts(counts);
    Ok(true)
}

fn print_leave_counts(counts: LeaveCounts) {
    println!(
        "Pending {} | Approved {} | Rejected {} | Total {}",
        counts.pending, counts.approved, counts.rejected, counts.total
    );
}

fn insert_opt(fields: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), Value::String(value));
    }
}
