use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::config::Settings;

use anyhow::{bail, Result};
use duedeck_core::schema::{decode_decks, decode_scores};
use duedeck_core::source::fetch_collection;
use duedeck_core::{
    all_decks_view, due_decks_view, filter_by_name, service, summarize, totals, Collection,
    DeckService, DeckSummary,
};
use duedeck_json::Snapshot;
use std::sync::Arc;

pub async fn run_cli(args: Cli, settings: Settings) -> Result<()> {
    match args.cmd.clone() {
        Command::Decks(cmd) => decks_cmd(&settings, cmd).await,
        Command::Snapshot => snapshot_cmd(&settings).await,
        Command::Api(api) => {
            let svc = Arc::new(settings.deck_service()?);
            let addr = api.addr.unwrap_or_else(|| settings.api_addr.clone());
            let addr: std::net::SocketAddr = addr.parse()?;
            api_server::run(svc, addr).await
        }
        // main runs the TUI on its own runtime
        Command::Tui => bail!("the TUI is started from main"),
    }
}

async fn decks_cmd(settings: &Settings, cmd: DecksCmd) -> Result<()> {
    let user = settings.user()?;
    let svc: DeckService = settings.deck_service()?;
    let today = service::today();
    let decks = svc.get_decks_on(&user, today).await?;

    let view = match cmd {
        DecksCmd::All { filter } => {
            let v = all_decks_view(&decks);
            match filter {
                Some(q) => filter_by_name(&v, &q),
                None => v,
            }
        }
        DecksCmd::Due => due_decks_view(&decks, today),
    };

    if view.is_empty() {
        println!("no decks");
    }
    for s in summarize(&view) {
        println!("{}", format_row(&s));
    }

    let t = totals(&decks, today);
    eprintln!(
        "{} deck(s), {} due, {} never reviewed, {} review(s) recorded",
        t.decks, t.due, t.never_reviewed, t.reviews
    );
    Ok(())
}

fn format_row(s: &DeckSummary) -> String {
    let last = match s.last_score_percent {
        Some(p) => format!("{p}%"),
        None => "-".to_string(),
    };
    format!(
        "{}\t{}\t{}\t{}\t{}",
        s.name,
        s.due_date.format("%Y-%m-%d"),
        s.repetitions,
        last,
        s.url
    )
}

async fn snapshot_cmd(settings: &Settings) -> Result<()> {
    let user = settings.user()?;
    let airtable = settings.airtable_source()?;
    let store = settings.snapshot_store()?;

    let (decks, scores) = tokio::try_join!(
        fetch_collection(&airtable, &user, Collection::Decks),
        fetch_collection(&airtable, &user, Collection::Scores),
    )?;
    // refuse to store records the resolver would reject later
    decode_decks(&decks)?;
    decode_scores(&scores)?;

    let (nd, ns) = (decks.len(), scores.len());
    store.save_snapshot(&user, Snapshot::new(decks, scores)).await?;
    println!(
        "saved {nd} deck(s) and {ns} score(s) to {}",
        store.user_file(&user).display()
    );
    Ok(())
}
