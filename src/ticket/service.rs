//! Ticket ingestion operations: create, get, delete
//!
//! Writes go to the ticket registry first, then the player's scores fan out
//! into the parameter indices named by the ticket's match parameters. The
//! registry is the single source of truth; index membership follows it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::error::TicketError;
use super::models::{MatchmakingTicket, PlayerParameter, TicketParameter};
use super::scoring;
use crate::store::{IndexEntry, IndexMember, ParameterIndex, TicketStore};

#[derive(Debug, Clone)]
pub struct TicketServiceConfig {
    /// Registry namespace for open tickets.
    pub tickets_set_name: String,
    /// Namespace holding finished sessions, keyed by participant.
    pub matches_set_name: String,
}

pub struct CreateTicketInput {
    pub player_id: String,
    pub player_username: String,
    pub player_parameters: Vec<PlayerParameter>,
    pub match_parameters: Vec<TicketParameter>,
}

pub struct TicketService {
    tickets: Arc<dyn TicketStore>,
    indices: Arc<dyn ParameterIndex>,
    cfg: TicketServiceConfig,
}

impl TicketService {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        indices: Arc<dyn ParameterIndex>,
        cfg: TicketServiceConfig,
    ) -> Self {
        Self {
            tickets,
            indices,
            cfg,
        }
    }

    /// Open a ticket for a player and score them into the parameter indices.
    ///
    /// Match parameters the player did not submit a value for are skipped:
    /// such a player is simply never returned for that dimension.
    pub async fn create_ticket(
        &self,
        input: CreateTicketInput,
    ) -> Result<MatchmakingTicket, TicketError> {
        if input.match_parameters.is_empty() {
            return Err(TicketError::InvalidParameters(
                "match parameters must not be empty",
            ));
        }
        if input.player_parameters.is_empty() {
            return Err(TicketError::InvalidParameters(
                "player parameters must not be empty",
            ));
        }

        let ticket = MatchmakingTicket::open(
            input.player_id,
            input.player_username,
            input.match_parameters,
        );
        self.tickets
            .put(&self.cfg.tickets_set_name, &ticket.player_id, &ticket)
            .await?;

        let player_values: HashMap<&str, f64> = input
            .player_parameters
            .iter()
            .map(|p| (p.param_type.as_str(), p.value))
            .collect();

        // Scores are computed up front; `index_score` draws randomness and
        // must not be held across an await.
        let scored: Vec<(String, f64)> = ticket
            .match_parameters
            .iter()
            .filter_map(|p| {
                player_values
                    .get(p.param_type.as_str())
                    .map(|value| (p.param_type.clone(), scoring::index_score(&p.param_type, *value)))
            })
            .collect();

        for (index_name, score) in scored {
            self.indices
                .add(
                    &index_name,
                    IndexEntry {
                        member: IndexMember {
                            player_id: ticket.player_id.clone(),
                            player_username: ticket.player_username.clone(),
                        },
                        score,
                    },
                )
                .await?;
        }

        debug!(
            player = %ticket.player_id,
            parameters = ticket.match_parameters.len(),
            "opened matchmaking ticket"
        );
        Ok(ticket)
    }

    /// Look up a player's ticket: the open registry first, then the matches
    /// map, so a matched player can still discover their session.
    pub async fn get_ticket(&self, player_id: &str) -> Result<MatchmakingTicket, TicketError> {
        if let Some(ticket) = self
            .tickets
            .get(&self.cfg.tickets_set_name, player_id)
            .await?
        {
            return Ok(ticket);
        }
        if let Some(ticket) = self
            .tickets
            .get(&self.cfg.matches_set_name, player_id)
            .await?
        {
            return Ok(ticket);
        }
        Err(TicketError::NotFound)
    }

    /// Remove a player's open ticket from the registry.
    ///
    /// Index entries are left behind; a dangling member never re-appears in
    /// the registry scan, so the match worker ignores it.
    pub async fn delete_ticket(&self, player_id: &str) -> Result<(), TicketError> {
        if !self
            .tickets
            .delete(&self.cfg.tickets_set_name, player_id)
            .await?
        {
            return Err(TicketError::NotFound);
        }
        debug!(player = %player_id, "deleted matchmaking ticket");
        Ok(())
    }
}
