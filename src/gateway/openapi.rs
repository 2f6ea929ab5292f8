//! OpenAPI document for the matchmaking API

use utoipa::OpenApi;

use super::handlers;
use super::types;
use crate::matchmaker::events;
use crate::ticket::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Matchforge API",
        description = "Matchmaking tickets and session formation"
    ),
    paths(
        handlers::create_ticket,
        handlers::get_ticket,
        handlers::delete_ticket,
        handlers::match_players,
        handlers::health,
    ),
    components(schemas(
        types::CreateTicketRequest,
        types::GetTicketResponse,
        types::DeleteTicketResponse,
        types::HealthResponse,
        types::ErrorBody,
        models::MatchmakingTicket,
        models::TicketParameter,
        models::PlayerParameter,
        models::TicketStatus,
        models::ParameterOperator,
        events::SessionEnvelope,
        events::PlayerSession,
        events::EligiblePlayer,
    )),
    tags(
        (name = "Tickets", description = "Open, inspect, and withdraw tickets"),
        (name = "Matchmaking", description = "Epoch control"),
        (name = "System", description = "Probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.contains(&&"/matchmaking/tickets".to_string()));
        assert!(paths.contains(&&"/matchmaking/players/{id}/ticket".to_string()));
        assert!(paths.contains(&&"/matchmaking/match-players".to_string()));
        assert!(paths.contains(&&"/health".to_string()));
    }
}
