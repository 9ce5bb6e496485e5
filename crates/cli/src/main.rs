//! Warband CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write the default config and create the data directory
//! - `serve`   — Start the HTTP API and dashboard
//! - `status`  — Show configuration and roster summary
//! - `doctor`  — Diagnose configuration and storage
//! - `vault`   — Print Great Vault grids
//! - `week`    — Set the current season week

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "warband",
    about = "Warband — season roster and Great Vault tracker",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and data directory
    Init,

    /// Start the HTTP API and dashboard
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration and roster summary
    Status,

    /// Diagnose configuration and storage
    Doctor,

    /// Print the Great Vault grid for one or all characters
    Vault {
        /// Only this character
        #[arg(short, long)]
        character: Option<u32>,

        /// Season week (defaults to the current week)
        #[arg(short, long, allow_negative_numbers = true)]
        week: Option<i64>,
    },

    /// Set the current season week (0-12)
    ///
    /// Writes the roster directly. A running `warband serve` does not see
    /// the change and may overwrite it; stop the server first, or use the
    /// dashboard's week selector while it is running.
    Week {
        #[arg(allow_negative_numbers = true)]
        week: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Vault { character, week } => commands::vault::run(character, week).await?,
        Commands::Week { week } => commands::week::run(week).await?,
    }

    Ok(())
}
