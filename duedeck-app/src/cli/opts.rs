use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::SourceKind;

#[derive(Debug, Parser, Clone)]
#[command(name = "duedeck", version, about = "DueDeck CLI/TUI/API")]
pub struct Cli {
    /// Settings file (defaults to duedeck.toml in the user config dir)
    #[arg(long, env = "DUEDECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where deck and score records come from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Learner whose decks to show
    #[arg(long, env = "DUEDECK_USER")]
    pub user: Option<String>,

    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub airtable_api_key: Option<String>,

    #[arg(long, env = "AIRTABLE_BASE_ID")]
    pub airtable_base_id: Option<String>,

    /// Snapshot directory when --source json
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List decks (CLI)
    #[command(subcommand)]
    Decks(DecksCmd),
    /// Copy the user's Airtable records into a local JSON snapshot
    Snapshot,
    /// Launch Terminal UI
    Tui,
    /// Launch Axum HTTP API
    Api(ApiCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum DecksCmd {
    /// Every deck, soonest due first
    All {
        /// Only decks whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Decks due today or overdue
    Due,
}

#[derive(Debug, Args, Clone)]
pub struct ApiCmd {
    /// Bind address (host:port); overrides api_addr from the settings file
    #[arg(long)]
    pub addr: Option<String>,
}
