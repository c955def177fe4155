use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use sync_console::{Config, ContentRequest, SurfaceState, SyncConsole, SyncStatus};

#[derive(Debug, Parser)]
#[command(name = "sync-console")]
#[command(about = "Inspect knowledge-sync runs, their logs and changed content")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List one page of sync runs
    List {
        #[arg(default_value = "1")]
        page: u32,
        /// Only show runs with this status (completed, completed_with_errors, failure, in_progress)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show the details of one sync run
    Detail { sync_id: String },
    /// Print the log of one sync run
    Log {
        sync_id: String,
        /// Only print lines containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Write the full log to the export directory
        #[arg(long)]
        export: bool,
    },
    /// Print the raw content of a stored object
    Content {
        path: String,
        #[arg(long, default_value = "html")]
        content_type: String,
    },
    /// Compare two stored objects
    Diff {
        old: String,
        new: String,
        #[arg(long, default_value = "html")]
        content_type: String,
    },
    /// Start a knowledge sync
    Trigger,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    let config = Config::load().await;
    let console = match SyncConsole::connect(&config) {
        Ok(console) => console,
        Err(err) => {
            error!(error = %err, "Failed to build API client");
            return ExitCode::FAILURE;
        }
    };

    match run(&console, app.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(console: &SyncConsole, command: Commands) -> Result<(), String> {
    match command {
        Commands::List { page, status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            console.set_status_filter(status);
            let window = console.load_page(page).await.map_err(|e| e.to_string())?;
            let now = Utc::now();
            for summary in &window.summaries {
                println!(
                    "{:<24} {:<22} {:<12} {}",
                    summary.sync_id,
                    summary.status.label(),
                    summary.trigger_type,
                    summary.ended_ago(now)
                );
            }
            let marker = if window.total_is_estimate { "~" } else { "" };
            println!("page {} of {}{}", window.page, marker, window.total_pages);
            Ok(())
        }
        Commands::Detail { sync_id } => {
            let surface = console.open_event_details(&sync_id).await;
            let detail = ready(surface)?;
            println!("{} [{}] via {}", detail.sync_id, detail.status.label(), detail.trigger_type);
            println!(
                "added {} / updated {} / deleted {}",
                detail.pages_added, detail.pages_updated, detail.pages_deleted
            );
            for change in &detail.changes {
                let diffable = if change.is_diffable() { " (diff)" } else { "" };
                println!("  {} {}{}", change.action, change.page_id, diffable);
            }
            for err in &detail.errors {
                println!("  error: {}", err.message);
            }
            Ok(())
        }
        Commands::Log {
            sync_id,
            search,
            export,
        } => {
            let surface = console.open_full_log(&sync_id).await;
            if let Some(err) = surface.error {
                return Err(err.message);
            }
            if let Some(term) = search.as_deref() {
                console.set_log_search(term);
            }
            if export {
                let path = console.export_full_log().await.map_err(|e| e.to_string())?;
                println!("exported to {}", path.display());
                return Ok(());
            }
            let view = console.full_log().data.ok_or("log not loaded")?;
            for line in view.visible_lines() {
                println!("{:>6}  {}", line.number, line.text);
            }
            Ok(())
        }
        Commands::Content { path, content_type } => {
            let surface = console
                .open_content(ContentRequest::for_path(content_type, path))
                .await;
            let view = ready(surface)?;
            println!("{}", view.blob.display_text());
            Ok(())
        }
        Commands::Diff {
            old,
            new,
            content_type,
        } => {
            let surface = console
                .open_diff(
                    ContentRequest::for_path(content_type.clone(), old),
                    ContentRequest::for_path(content_type, new),
                )
                .await;
            let payload = surface.data.ok_or("diff not loaded")?;
            for err in payload.partial_errors() {
                eprintln!("{err}");
            }
            println!("--- old\n{}", payload.old.text());
            println!("+++ new\n{}", payload.new.text());
            Ok(())
        }
        Commands::Trigger => {
            console.trigger_sync().await.map_err(|e| e.to_string())?;
            println!("sync triggered");
            Ok(())
        }
    }
}

fn ready<I, T>(surface: SurfaceState<I, T>) -> Result<T, String> {
    if let Some(err) = surface.error {
        return Err(err.message);
    }
    surface.data.ok_or_else(|| "nothing loaded".to_string())
}

fn parse_status(raw: &str) -> Result<SyncStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| format!("unknown status: {raw}"))
        .and_then(|status| match status {
            SyncStatus::Unknown => Err(format!("unknown status: {raw}")),
            status => Ok(status),
        })
}
