//! NextYou CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config
//! - `serve`    — Start the HTTP gateway
//! - `ask`      — Run one coaching turn from the terminal
//! - `prompt`   — Show the system prompt a turn would send
//! - `history`  — Print recent chat log rows
//! - `doctor`   — Diagnose config, provider and chat log

use clap::{Parser, Subcommand};

mod commands;

use commands::TurnArgs;

#[derive(Parser)]
#[command(
    name = "nextyou",
    about = "NextYou — fitness coaching chat backend",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message to the coach
    Ask {
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Print the composed system prompt without calling the model
    Prompt {
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Show recent chat history
    History {
        /// Number of rows (defaults to `chat_log.history_limit`)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { turn } => commands::ask::run(turn).await?,
        Commands::Prompt { turn } => commands::prompt::run(turn).await?,
        Commands::History { limit, json } => commands::history::run(limit, json).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
