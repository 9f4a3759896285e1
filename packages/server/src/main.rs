#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the fitboard dashboard.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fitboard_config::DashboardConfig;
use fitboard_server::{AppState, ServerError, run_server};

#[derive(Parser)]
#[command(name = "fitboard_server", about = "Fitness challenge leaderboard dashboard")]
struct Cli {
    /// Config file (defaults to `fitboard.toml` when present)
    #[arg(long, short, env = "FITBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP (default)
    Serve,
    /// Fetch the tables once and print the dashboard JSON
    Report {
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// List the configured tables and their fetch strategies
    Sources,
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Report { compact } => {
            let state = AppState::from_config(config)?;
            let dashboard = state.dashboard().await?;
            let json = if compact {
                serde_json::to_string(&dashboard)?
            } else {
                serde_json::to_string_pretty(&dashboard)?
            };
            println!("{json}");
            Ok(())
        }
        Commands::Sources => {
            for (role, strategies) in config.tables.describe() {
                println!("{role}:");
                for (i, strategy) in strategies.iter().enumerate() {
                    println!("  {}. {strategy}", i + 1);
                }
            }
            Ok(())
        }
    }
}
