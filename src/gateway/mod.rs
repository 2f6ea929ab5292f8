//! HTTP gateway
//!
//! Thin JSON plumbing over the ticket service and the match engine. CORS is
//! wide open, matching the browser clients the ticket API serves.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/matchmaking/tickets", post(handlers::create_ticket))
        .route(
            "/matchmaking/players/{id}/ticket",
            get(handlers::get_ticket).delete(handlers::delete_ticket),
        )
        .route("/matchmaking/match-players", get(handlers::match_players))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("gateway listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
