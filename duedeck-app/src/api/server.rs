use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::api::routes::{all_decks, due_decks, health, AppState};
use duedeck_core::DeckService;

pub fn router(service: Arc<DeckService>) -> Router {
    let state = Arc::new(AppState { service });

    Router::new()
        .route("/health", get(health))
        .route("/decks/all", get(all_decks))
        .route("/decks/due", get(due_decks))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(service: Arc<DeckService>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(service);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "api listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
