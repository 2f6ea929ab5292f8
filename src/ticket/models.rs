//! Ticket data model
//!
//! A [`MatchmakingTicket`] is a player's open request to be grouped into a
//! session. Wire names follow the public JSON contract (PascalCase), which is
//! also the shape persisted in the ticket registry.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Open and visible to the match worker.
    Pending,
    /// Bound into a session; lives in the matches map only.
    Found,
    /// Outlived the matchmaker timeout; waits for the cleaner.
    Expired,
}

/// Comparison operator a ticket parameter applies to opponents' scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ParameterOperator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    SmallerThan,
    #[serde(rename = ">")]
    GreaterThan,
}

/// One dimension a ticket asks to be matched on.
///
/// `param_type` names the parameter index queried for this dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketParameter {
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(rename = "Operator")]
    pub operator: ParameterOperator,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// The player's own value on a dimension, submitted at create time.
///
/// Not stored on the ticket; it only seeds the player's score in the
/// corresponding parameter index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlayerParameter {
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// A player's open request to be matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchmakingTicket {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "PlayerId")]
    pub player_id: String,
    #[serde(rename = "PlayerUsername")]
    pub player_username: String,
    /// Seconds since epoch.
    #[serde(rename = "CreatedAt")]
    pub created_at: i64,
    #[serde(rename = "Status")]
    pub status: TicketStatus,
    /// Empty while pending or expired; set when the ticket is found.
    #[serde(rename = "GameSessionId")]
    pub game_session_id: String,
    #[serde(rename = "MatchParameters")]
    pub match_parameters: Vec<TicketParameter>,
}

impl MatchmakingTicket {
    /// Mint a fresh pending ticket for a player.
    pub fn open(
        player_id: impl Into<String>,
        player_username: impl Into<String>,
        match_parameters: Vec<TicketParameter>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_id: player_id.into(),
            player_username: player_username.into(),
            created_at: Utc::now().timestamp(),
            status: TicketStatus::Pending,
            game_session_id: String::new(),
            match_parameters,
        }
    }

    /// True once the ticket's age strictly exceeds `threshold` at `now`.
    ///
    /// Shared by the match worker (expiry) and the cleaner (removal); both
    /// use the same strict comparison.
    pub fn has_outlived(&self, threshold: Duration, now: i64) -> bool {
        now > self.created_at + threshold.as_secs() as i64
    }

    /// Value of the `game_type` parameter, if the ticket carries one.
    pub fn game_type(&self) -> Option<i64> {
        self.match_parameters
            .iter()
            .find(|p| p.param_type == super::scoring::GAME_TYPE)
            .map(|p| p.value as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_with(params: Vec<TicketParameter>) -> MatchmakingTicket {
        MatchmakingTicket::open("p1", "alice", params)
    }

    #[test]
    fn open_ticket_is_pending_with_empty_session() {
        let t = ticket_with(vec![]);
        assert_eq!(t.status, TicketStatus::Pending);
        assert!(t.game_session_id.is_empty());
        assert!(!t.id.is_empty());
    }

    #[test]
    fn wire_format_uses_pascal_case_names() {
        let t = MatchmakingTicket {
            id: "t-1".to_string(),
            player_id: "p1".to_string(),
            player_username: "alice".to_string(),
            created_at: 1_700_000_000,
            status: TicketStatus::Pending,
            game_session_id: String::new(),
            match_parameters: vec![TicketParameter {
                param_type: "game_type".to_string(),
                operator: ParameterOperator::Equal,
                value: 0.0,
            }],
        };

        let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&t).unwrap())
            .unwrap();
        assert_eq!(json["ID"], "t-1");
        assert_eq!(json["PlayerId"], "p1");
        assert_eq!(json["Status"], "pending");
        assert_eq!(json["MatchParameters"][0]["Type"], "game_type");
        assert_eq!(json["MatchParameters"][0]["Operator"], "=");
    }

    #[test]
    fn operator_round_trips_symbolic_forms() {
        for (op, symbol) in [
            (ParameterOperator::Equal, "\"=\""),
            (ParameterOperator::NotEqual, "\"<>\""),
            (ParameterOperator::SmallerThan, "\"<\""),
            (ParameterOperator::GreaterThan, "\">\""),
        ] {
            assert_eq!(serde_json::to_string(&op).unwrap(), symbol);
            let back: ParameterOperator = serde_json::from_str(symbol).unwrap();
            assert_eq!(back, op);
        }
    }

    #[test]
    fn has_outlived_is_strict() {
        let mut t = ticket_with(vec![]);
        t.created_at = 1_000;
        let timeout = Duration::from_secs(30);

        assert!(!t.has_outlived(timeout, 1_030));
        assert!(t.has_outlived(timeout, 1_031));
    }

    #[test]
    fn game_type_lookup_reads_the_matching_parameter() {
        let t = ticket_with(vec![
            TicketParameter {
                param_type: "region".to_string(),
                operator: ParameterOperator::Equal,
                value: 3.0,
            },
            TicketParameter {
                param_type: "game_type".to_string(),
                operator: ParameterOperator::Equal,
                value: 1.0,
            },
        ]);
        assert_eq!(t.game_type(), Some(1));

        let none = ticket_with(vec![]);
        assert_eq!(none.game_type(), None);
    }
}
