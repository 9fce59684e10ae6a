//! semnotes CLI — operator interface for the student-notes portal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod app;
mod commands;

#[derive(Parser)]
#[command(name = "semnotes", version, about = "Student-notes portal administration")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Credentials for commands that act as an admin.
#[derive(clap::Args)]
pub struct AdminArgs {
    /// Admin username
    #[arg(long = "admin", default_value = "admin")]
    pub username: String,

    /// Admin password
    #[arg(long, env = "SEMNOTES_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example catalog
    Init,

    /// Create an account (the first one becomes the main admin)
    Register {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SEMNOTES_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(long, default_value = "")]
        name: String,

        /// Semester, 1 to 8 (students only, default 1)
        #[arg(long)]
        semester: Option<u8>,
    },

    /// Validate catalog TOML files
    Validate {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Import subjects, topics and papers from a catalog
    Import {
        /// Path to catalog file or directory
        #[arg(long)]
        catalog: PathBuf,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Recompute every student's score once
    Recompute,

    /// Show the leaderboard
    Leaderboard {
        /// Show only the top N students
        #[arg(long)]
        limit: Option<usize>,

        /// Output format: table, json, markdown, html
        #[arg(long, default_value = "table")]
        format: String,

        /// Write to a file instead of stdout (json and html)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show a student's progress per subject
    Progress {
        /// Email or username
        #[arg(long)]
        user: String,

        /// Output format: table, json, html
        #[arg(long, default_value = "table")]
        format: String,

        /// Write to a file instead of stdout (json and html)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the score scheduler until interrupted
    Schedule,

    /// Moderate community notes
    Notes {
        #[command(subcommand)]
        action: NotesAction,

        #[command(flatten)]
        admin: AdminArgs,
    },
}

#[derive(Subcommand)]
pub enum NotesAction {
    /// List notes awaiting moderation
    Pending,
    /// Approve a note and recompute scores
    Approve { id: Uuid },
    /// Reject a note
    Reject { id: Uuid },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("semnotes=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Register {
            email,
            password,
            name,
            semester,
        } => commands::register::execute(config, email, password, name, semester).await,
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::Import { catalog, admin } => {
            commands::import::execute(config, catalog, admin).await
        }
        Commands::Recompute => commands::recompute::execute(config).await,
        Commands::Leaderboard {
            limit,
            format,
            output,
        } => commands::leaderboard::execute(config, limit, format, output).await,
        Commands::Progress {
            user,
            format,
            output,
        } => commands::progress::execute(config, user, format, output).await,
        Commands::Schedule => commands::schedule::execute(config).await,
        Commands::Notes { action, admin } => commands::notes::execute(config, action, admin).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
