mod config;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use client_core::{
    admin::{format_event_details, format_stats, format_user_enrollments},
    draft::{submit_event, validate_draft},
    render::{format_event_date, spots_text},
    service::AdminService,
    AdminConsole, ClientResult, DeleteTarget, EnrollAction, EnrollmentController,
    FileIdentityStore, HttpEventService, Trigger, TypeFilter,
};
use shared::{
    domain::{Event, EventId, UserId},
    protocol::{EventDraft, RegisterRequest},
};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "enroll", about = "Browse, join and manage community events")]
struct Cli {
    /// Overrides the configured service URL.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Overrides where the remembered identity is kept.
    #[arg(long, global = true)]
    identity_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List upcoming events.
    Events {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "type", default_value = "any")]
        event_type: TypeFilter,
        /// Print the rendered card markup instead of a table.
        #[arg(long)]
        html: bool,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    Enroll {
        event_id: i64,
        #[arg(long)]
        yes: bool,
    },
    /// Show the remembered identity.
    Whoami,
    Users,
    Stats,
    /// Show an event and its participants.
    Event {
        event_id: i64,
    },
    /// Show a user's enrollments.
    User {
        user_id: i64,
    },
    CreateEvent {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        event_type: String,
        #[arg(long)]
        location: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        time: String,
        #[arg(long)]
        max_participants: Option<u32>,
        #[arg(long)]
        organizer_name: String,
        #[arg(long)]
        organizer_email: String,
    },
    DeleteEvent {
        event_id: i64,
        #[arg(long)]
        yes: bool,
    },
    DeleteUser {
        user_id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    if let Some(identity_path) = cli.identity_path {
        settings.identity_path = identity_path;
    }

    let service = Arc::new(
        HttpEventService::with_timeout(&settings.server_url, settings.request_timeout())
            .with_context(|| format!("invalid server url '{}'", settings.server_url))?,
    );
    tracing::debug!(server = %service.base_url(), command = ?cli.command, "enroll: dispatching");

    match cli.command {
        Command::Events {
            search,
            event_type,
            html,
        } => {
            let mut page = page(&service, &settings);
            let (output, loaded) = list_events(&mut page, search, event_type, html).await;
            if !output.is_empty() {
                println!("{output}");
            }
            loaded.map_err(|err| anyhow::anyhow!(err.user_message()))?;
        }
        Command::Register { name, email } => {
            let mut page = page(&service, &settings);
            let result = page.register(&name, &email).await;
            if let Some(banner) = &page.surface().user_status {
                println!("{}", banner.message);
            }
            let identity = result?;
            println!("Registered as user_id={}", identity.id);
        }
        Command::Enroll { event_id, yes } => {
            let mut page = page(&service, &settings);
            page.initialize()
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            let prompt = match page.request_enrollment(EventId(event_id)) {
                Ok(prompt) => prompt,
                Err(err) => bail!(err.user_message()),
            };
            if !yes && !confirm(&prompt.message)? {
                page.handle(Trigger::DismissEnrollment).await;
                println!("Enrollment cancelled.");
                return Ok(());
            }
            let result = page.confirm_enrollment().await;
            if let Some(alert) = page.take_alert() {
                println!("{alert}");
            }
            result?;
            if let Some(event) = page.events().iter().find(|event| event.id.0 == event_id) {
                println!("{}", event_line(event, page.enroll_action(event)));
            }
        }
        Command::Whoami => {
            let mut page = page(&service, &settings);
            match page.restore_identity() {
                Some(identity) => println!(
                    "{} <{}> (user_id={})",
                    identity.name, identity.email, identity.id
                ),
                None => println!("No identity remembered. Run `enroll register` first."),
            }
        }
        Command::Users => {
            let console = AdminConsole::new(service.clone());
            let users = console.users().await?;
            if users.is_empty() {
                println!("No users yet");
            }
            for user in users {
                println!(
                    "#{:<4} {:<24} {:<32} {}",
                    user.id.0,
                    user.name,
                    user.email,
                    user.created_at.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Stats => {
            let console = AdminConsole::new(service.clone());
            println!("{}", format_stats(&console.stats().await?));
        }
        Command::Event { event_id } => {
            let console = AdminConsole::new(service.clone());
            let details = console.event_details(EventId(event_id)).await?;
            println!("{}", format_event_details(&details));
        }
        Command::User { user_id } => {
            let console = AdminConsole::new(service.clone());
            let summary = console.user_enrollments(UserId(user_id)).await?;
            println!("{}", format_user_enrollments(&summary));
        }
        Command::CreateEvent {
            title,
            description,
            event_type,
            location,
            date,
            time,
            max_participants,
            organizer_name,
            organizer_email,
        } => {
            let draft = EventDraft {
                title,
                description,
                event_type,
                location,
                event_date: date,
                event_time: time,
                max_participants,
                created_by: None,
            };
            validate_draft(&draft, Local::now().date_naive())?;
            let organizer = RegisterRequest {
                name: organizer_name,
                email: organizer_email,
            };
            let submission = submit_event(service.as_ref(), draft, organizer).await?;
            println!(
                "{}",
                submission
                    .acknowledgement
                    .message
                    .as_deref()
                    .unwrap_or("Event created successfully")
            );
            match submission.created_by {
                Some(user_id) => println!("Organizer user_id={user_id}"),
                None => println!("Event created without an organizer"),
            }
        }
        Command::DeleteEvent { event_id, yes } => {
            let event = service.fetch_event(EventId(event_id)).await?;
            let target = DeleteTarget::Event(event.id);
            delete(&service, target, &event.title, yes).await?;
        }
        Command::DeleteUser { user_id, yes } => {
            let user = service.fetch_user(UserId(user_id)).await?;
            let target = DeleteTarget::User(user.id);
            delete(&service, target, &user.name, yes).await?;
        }
    }

    Ok(())
}

/// Output for `enroll events` plus the load outcome. The markup form is
/// produced even when loading fails, so it carries the error placeholder.
async fn list_events(
    page: &mut EnrollmentController,
    search: String,
    event_type: TypeFilter,
    html: bool,
) -> (String, ClientResult<()>) {
    let loaded = page.initialize().await;
    page.handle(Trigger::SearchChanged(search)).await;
    page.handle(Trigger::TypeFilterChanged(event_type)).await;

    if html {
        return (page.surface().events_markup.clone(), loaded);
    }
    if loaded.is_err() {
        return (String::new(), loaded);
    }
    let visible = page.visible_events();
    if visible.is_empty() {
        return ("No events found".to_string(), loaded);
    }
    let lines: Vec<String> = visible
        .into_iter()
        .map(|event| event_line(event, page.enroll_action(event)))
        .collect();
    (lines.join("\n"), loaded)
}

fn page(service: &Arc<HttpEventService>, settings: &Settings) -> EnrollmentController {
    let store = Arc::new(FileIdentityStore::new(settings.identity_path.clone()));
    EnrollmentController::new(service.clone(), store)
}

async fn delete(
    service: &Arc<HttpEventService>,
    target: DeleteTarget,
    name: &str,
    yes: bool,
) -> Result<()> {
    let mut console = AdminConsole::new(service.clone());
    let prompt = console.request_delete(target, name);
    if !yes && !confirm(&prompt.message)? {
        console.cancel_delete();
        println!("Nothing deleted.");
        return Ok(());
    }
    let deleted = console.confirm_delete().await?;
    println!("Deleted {deleted}");
    Ok(())
}

fn event_line(event: &Event, action: EnrollAction) -> String {
    let status = match action {
        EnrollAction::DisabledNoIdentity => "Register first to enroll",
        action => action.label(),
    };
    format!(
        "#{:<4} {} [{}] {} {} @ {} | {} | {}",
        event.id.0,
        event.title,
        event.event_type,
        format_event_date(event.event_date),
        event.event_time,
        event.location,
        spots_text(event),
        status
    )
}

fn confirm(message: &str) -> Result<bool> {
    print!("{message} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
