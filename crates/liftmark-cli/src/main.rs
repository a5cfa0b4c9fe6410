//! Liftmark CLI - Command-line interface for favorite-exercise tracking
//!
//! Local-first favorites with opportunistic sync against the Liftmark API.

use clap::Parser;

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

use cli::{Cli, Commands, StatsCommands};
use commands::common::resolve_db_path;
use error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("liftmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Add { exercise_id } => {
            commands::favorites::run_add(&exercise_id, &db_path, profile).await?;
        }
        Commands::Remove { exercise_id } => {
            commands::favorites::run_remove(&exercise_id, &db_path, profile).await?;
        }
        Commands::Toggle { exercise_id } => {
            commands::favorites::run_toggle(&exercise_id, &db_path, profile).await?;
        }
        Commands::List { all, json } => {
            commands::favorites::run_list(all, json, &db_path)?;
        }
        Commands::Sync => commands::sync::run_sync(&db_path, profile).await?,
        Commands::Auth { command } => commands::auth_cmd::run_auth(command, profile).await?,
        Commands::Config { command } => commands::config::run_config(command, profile)?,
        Commands::Stats { command } => {
            let command = command.unwrap_or(StatsCommands::Show {
                columns: None,
                width: None,
            });
            commands::stats::run_stats(command, &db_path)?;
        }
        Commands::Zones { age, json } => commands::zones::run_zones(age, json)?,
        Commands::Changelog { mark_seen } => {
            commands::changelog::run_changelog(mark_seen, &db_path)?;
        }
        Commands::Completions { shell, output } => {
            commands::completions::run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
