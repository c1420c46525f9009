//! Jobfeed CLI - resumable ingestion of the NAV job-posting feed.

mod commands;
mod config;
mod progress;
mod shutdown;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jobfeed")]
#[command(version)]
#[command(about = "Resumable ingestion of a paginated job-posting feed")]
#[command(
    long_about = "Jobfeed walks the job-posting feed page by page, fetches every posting's \
detail record and stores it in a relational database. Progress is kept in a cursor so an \
interrupted run resumes where it stopped."
)]
#[command(after_long_help = r#"EXAMPLES
    Continue from the stored cursor (or the newest page on first run):
        $ jobfeed sync

    Start over from the oldest page, saving at most 500 postings:
        $ jobfeed sync --reset --from-beginning --limit 500

    Find the page where March 2025 begins and start there:
        $ jobfeed seek 2025-03-01
        $ jobfeed sync --start-page-id <ID> --start-date 2025-03-01

CONFIGURATION
    Jobfeed reads configuration from:
      1. ~/.config/jobfeed/config.toml (or $XDG_CONFIG_HOME/jobfeed/config.toml)
      2. ./jobfeed.toml
      3. Environment variables (JOBFEED_* prefix, e.g., JOBFEED_FEED_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    JOBFEED_DATABASE_URL   Database connection string (default: ~/.local/state/jobfeed/jobfeed.db)
    JOBFEED_FEED_URL       Feed base URL (default: https://pam-stilling-feed.nav.no)
    JOBFEED_FEED_TOKEN     Feed API token
    NAV_API_TOKEN          Feed API token (legacy)
    DATABASE_URL           Database connection string (legacy)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest feed pages into the database
    Sync(SyncArgs),
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Print the id of the first page with postings on or after a date
    Seek {
        /// Date (YYYY-MM-DD)
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

/// Options for the sync command.
#[derive(Debug, Clone, clap::Args)]
struct SyncArgs {
    /// Stop after saving this many postings
    #[arg(short = 'l', long)]
    limit: Option<usize>,

    /// Discard the stored cursor before starting
    #[arg(long)]
    reset: bool,

    /// Start from the oldest page when there is no cursor (default: newest)
    #[arg(long)]
    from_beginning: bool,

    /// Skip postings published before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    start_date: Option<NaiveDate>,

    /// Start from this page id, ignoring the stored cursor
    #[arg(long)]
    start_page_id: Option<String>,

    /// Maximum concurrent detail fetches (default from config or 10)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Skip postings by their feed summary date without fetching them
    #[arg(long)]
    summary_prefilter: bool,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{raw}': {e}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("jobfeed=info,jobfeed_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    if let Commands::Seek { date } = &cli.command {
        commands::seek::handle_seek(*date, &config).await?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL; set database.url or JOBFEED_DATABASE_URL")?;

    // Ensure the database directory exists for SQLite
    if database_url.starts_with("sqlite://") {
        let db_path = database_url.trim_start_matches("sqlite://");
        // Strip query parameters (e.g., ?mode=rwc) before path operations
        let db_path = db_path.split('?').next().unwrap_or(db_path);
        let db_path = std::path::Path::new(db_path);

        if db_path.is_relative() && !db_path.as_os_str().is_empty() {
            tracing::warn!(
                "Database path '{}' is relative - behavior depends on current directory. \
                 Consider using an absolute path.",
                db_path.display()
            );
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
    }

    match cli.command {
        Commands::Sync(args) => {
            commands::sync::handle_sync(args, &config, &database_url).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Seek { .. } => {}
    }

    Ok(())
}
