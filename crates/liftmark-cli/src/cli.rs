use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "liftmark")]
#[command(about = "Track favorite exercises from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name for auth/sync configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mark an exercise as a favorite
    #[command(alias = "fav")]
    Add {
        /// Exercise identifier from the catalog
        exercise_id: String,
    },
    /// Remove an exercise from favorites
    #[command(alias = "unfav")]
    Remove {
        /// Exercise identifier from the catalog
        exercise_id: String,
    },
    /// Toggle an exercise's favorite state
    Toggle {
        /// Exercise identifier from the catalog
        exercise_id: String,
    },
    /// List favorite exercises
    List {
        /// Include pending deletes and sync status
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reconcile local favorites with the Liftmark API
    Sync,
    /// Authenticate CLI profile with the Liftmark API
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Workout session stats (heatmap and streak)
    Stats {
        #[command(subcommand)]
        command: Option<StatsCommands>,
    },
    /// Heart-rate training zones for an age
    Zones {
        /// Age in years
        #[arg(long)]
        age: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show release notes
    Changelog {
        /// Mark the changelog as seen
        #[arg(long)]
        mark_seen: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Record a workout session (defaults to today)
    Record {
        /// Session date, YYYY-MM-DD
        #[arg(value_name = "DATE")]
        date: Option<String>,
    },
    /// Show the session heatmap and current streak
    Show {
        /// Number of week columns to render
        #[arg(long, value_name = "N")]
        columns: Option<usize>,
        /// Fit columns to a terminal width instead
        #[arg(long, value_name = "CHARS", conflicts_with = "columns")]
        width: Option<u32>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Profile name to initialize
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Liftmark API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with email/password and store session in keychain
    Login {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
    /// Logout profile and clear stored session
    Logout {
        /// Optional profile override
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
