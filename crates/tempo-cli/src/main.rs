use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Tempo - timed focus sessions with durable history", long_about = None)]
struct Cli {
    /// Identity to act as (defaults to $USER)
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a focus session and count it down in the foreground
    Start {
        /// Session length in minutes (must be one of the configured durations)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// End a session by id (safe to repeat)
    End {
        /// ID of the session to end
        id: String,
    },
    /// List all stored sessions
    Sessions,
    /// List your completed sessions, newest first
    History,
    /// Repair history entries that failed to persist
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let owner = cli.owner.or_else(|| std::env::var("USER").ok());

    match cli.command {
        Commands::Start { minutes } => commands::start::run(owner, minutes).await?,
        Commands::End { id } => commands::end::run(owner, &id).await?,
        Commands::Sessions => commands::sessions::run(owner).await?,
        Commands::History => commands::history::run(owner).await?,
        Commands::Reconcile => commands::reconcile::run(owner).await?,
    }

    Ok(())
}
