//! HTTP handlers for the ticket API and the manual matchmaking trigger

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::state::AppState;
use super::types::{
    ApiError, CreateTicketRequest, DeleteTicketResponse, GetTicketResponse, HealthResponse,
};
use crate::matchmaker::SessionEnvelope;
use crate::ticket::MatchmakingTicket;

/// Open a matchmaking ticket
#[utoipa::path(
    post,
    path = "/matchmaking/tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = MatchmakingTicket),
        (status = 400, description = "Empty parameter lists"),
        (status = 500, description = "Store unavailable")
    ),
    tag = "Tickets"
)]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<MatchmakingTicket>), ApiError> {
    let ticket = state.tickets.create_ticket(req.into()).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Fetch a player's ticket
#[utoipa::path(
    get,
    path = "/matchmaking/players/{id}/ticket",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "The player's ticket", body = GetTicketResponse),
        (status = 404, description = "No ticket for this player")
    ),
    tag = "Tickets"
)]
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<GetTicketResponse>, ApiError> {
    let ticket = state.tickets.get_ticket(&player_id).await?;
    Ok(Json(GetTicketResponse { ticket }))
}

/// Withdraw a player's open ticket
#[utoipa::path(
    delete,
    path = "/matchmaking/players/{id}/ticket",
    params(("id" = String, Path, description = "Player id")),
    responses(
        (status = 200, description = "Ticket removed", body = DeleteTicketResponse),
        (status = 404, description = "No open ticket for this player")
    ),
    tag = "Tickets"
)]
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<DeleteTicketResponse>, ApiError> {
    state.tickets.delete_ticket(&player_id).await?;
    Ok(Json(DeleteTicketResponse { success: true }))
}

/// Trigger one matchmaking epoch by hand
///
/// Serialized against the scheduled worker through the engine's epoch lock.
#[utoipa::path(
    get,
    path = "/matchmaking/match-players",
    responses(
        (status = 200, description = "Sessions formed this epoch", body = SessionEnvelope),
        (status = 500, description = "Epoch aborted")
    ),
    tag = "Matchmaking"
)]
pub async fn match_players(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionEnvelope>, ApiError> {
    let envelope = state.matchmaker.match_players().await?;
    Ok(Json(envelope))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service healthy", body = HealthResponse)),
    tag = "System"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        timestamp_ms: Utc::now().timestamp_millis(),
        version: env!("GIT_HASH").to_string(),
    })
}
