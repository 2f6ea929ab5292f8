//! Request/response DTOs and the HTTP error mapping

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::matchmaker::MatchError;
use crate::ticket::{
    CreateTicketInput, MatchmakingTicket, PlayerParameter, TicketError, TicketParameter,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    #[serde(rename = "PlayerId")]
    pub player_id: String,
    #[serde(rename = "PlayerUsername", default)]
    pub player_username: String,
    #[serde(rename = "PlayerParameters", default)]
    pub player_parameters: Vec<PlayerParameter>,
    #[serde(rename = "MatchParameters", default)]
    pub match_parameters: Vec<TicketParameter>,
}

impl From<CreateTicketRequest> for CreateTicketInput {
    fn from(req: CreateTicketRequest) -> Self {
        Self {
            player_id: req.player_id,
            player_username: req.player_username,
            player_parameters: req.player_parameters,
            match_parameters: req.match_parameters,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetTicketResponse {
    #[serde(rename = "Ticket")]
    pub ticket: MatchmakingTicket,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTicketResponse {
    #[serde(rename = "Success")]
    pub success: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub timestamp_ms: i64,
    pub version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[serde(rename = "Error")]
    pub error: String,
}

/// HTTP-facing error: a status code plus a plain JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        let status = match err {
            TicketError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            TicketError::NotFound => StatusCode::NOT_FOUND,
            TicketError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn ticket_errors_map_to_http_statuses() {
        let bad: ApiError = TicketError::InvalidParameters("empty").into();
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let missing: ApiError = TicketError::NotFound.into();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let down: ApiError =
            TicketError::Store(StoreError::Unavailable("boom".to_string())).into();
        assert_eq!(down.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn create_request_accepts_the_public_wire_shape() {
        let req: CreateTicketRequest = serde_json::from_str(
            r#"{
                "PlayerId": "p1",
                "PlayerUsername": "alice",
                "PlayerParameters": [{"Type": "game_type", "Value": 0}],
                "MatchParameters": [{"Type": "game_type", "Operator": "=", "Value": 0}]
            }"#,
        )
        .unwrap();

        assert_eq!(req.player_id, "p1");
        assert_eq!(req.player_parameters.len(), 1);
        assert_eq!(req.match_parameters[0].param_type, "game_type");
    }
}
