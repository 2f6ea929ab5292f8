//! Session event envelope published to the downstream bus
//!
//! One envelope per epoch, written under the `match-found` key on the
//! `user-matchmaking` topic. Consumers must tolerate additional fields;
//! there is no schema versioning.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::IndexMember;

/// Logical topic the engine publishes session events to.
pub const MATCHMAKING_TOPIC: &str = "user-matchmaking";

/// Message key for session envelopes.
pub const MATCH_FOUND_KEY: &str = "match-found";

/// A participant of a formed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EligiblePlayer {
    #[serde(rename = "PlayerId")]
    pub player_id: String,
    #[serde(rename = "PlayerUsername")]
    pub player_username: String,
}

impl From<IndexMember> for EligiblePlayer {
    fn from(member: IndexMember) -> Self {
        Self {
            player_id: member.player_id,
            player_username: member.player_username,
        }
    }
}

/// A group of players the engine has bound together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlayerSession {
    #[serde(rename = "SessionID")]
    pub session_id: String,
    #[serde(rename = "PlayerIds")]
    pub players: Vec<EligiblePlayer>,
    #[serde(rename = "GameType")]
    pub game_type: String,
}

/// The per-epoch event envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionEnvelope {
    #[serde(rename = "CreatedSessions")]
    pub created_sessions: Vec<PlayerSession>,
    #[serde(rename = "GameType")]
    pub game_type: String,
}

/// Display label for a `game_type` parameter value.
pub fn game_type_label(value: i64) -> &'static str {
    if value == 0 {
        "normal"
    } else {
        "staked"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wire_format() {
        let envelope = SessionEnvelope {
            created_sessions: vec![PlayerSession {
                session_id: "s-1".to_string(),
                players: vec![EligiblePlayer {
                    player_id: "p1".to_string(),
                    player_username: "alice".to_string(),
                }],
                game_type: "normal".to_string(),
            }],
            game_type: "normal".to_string(),
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&envelope).unwrap()).unwrap();
        assert_eq!(json["GameType"], "normal");
        assert_eq!(json["CreatedSessions"][0]["SessionID"], "s-1");
        assert_eq!(
            json["CreatedSessions"][0]["PlayerIds"][0]["PlayerUsername"],
            "alice"
        );
    }

    #[test]
    fn game_type_labels() {
        assert_eq!(game_type_label(0), "normal");
        assert_eq!(game_type_label(1), "staked");
        assert_eq!(game_type_label(42), "staked");
    }
}
