mod cli;
mod config;
pub mod tui;
pub mod api;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use cli::commands::run_cli;
use cli::opts::{Cli, Command};
use config::Settings;
use tui::app::TuiApp;

fn init_tracing(quiet: bool) {
    // the TUI owns the terminal, so it only lets warnings through
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(matches!(args.cmd, Command::Tui));
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting duedeck");

    let settings = Settings::resolve(&args)?;

    match &args.cmd {
        // Run TUI on its own thread/runtime (no nested Tokio)
        Command::Tui => {
            let rt = Arc::new(Runtime::new()?);
            let user = settings.user()?;
            let svc = Arc::new(settings.deck_service()?);
            let mut app = TuiApp::new(svc, rt, user);
            app.run()
        }
        // Everything else uses a single runtime here
        _ => {
            let rt = Runtime::new()?;
            rt.block_on(run_cli(args, settings))
        }
    }
}
