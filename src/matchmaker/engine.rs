//! Match engine - one epoch of matchmaking
//!
//! An epoch scans the whole ticket registry page by page, fans out into the
//! parameter indices to collect compatible opponents for each pending
//! ticket, and retires matched tickets before their session is published.
//! Retirement mutates the registry first (it is authoritative), then the
//! indices; an interrupted retirement is re-observed and re-attempted by a
//! later epoch through the still-visible ticket.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::MatchError;
use super::events::{
    game_type_label, EligiblePlayer, PlayerSession, SessionEnvelope, MATCH_FOUND_KEY,
};
use crate::store::{EventSink, ParameterIndex, ScoreRange, StoreError, TicketStore};
use crate::ticket::models::{MatchmakingTicket, ParameterOperator, TicketParameter, TicketStatus};
use crate::ticket::scoring;

#[derive(Debug, Clone)]
pub struct MatchEngineConfig {
    pub tickets_set_name: String,
    pub matches_set_name: String,
    /// Session size. Never softened as tickets age.
    pub max_count_per_match: usize,
    /// Pending lifetime before a ticket expires.
    pub timeout: Duration,
    /// Registry scan page size.
    pub count_per_iteration: u64,
    /// Deadline applied to every individual store call.
    pub op_timeout: Duration,
}

/// Per-epoch scratch state.
struct EpochState {
    /// Players retired in this epoch. Index reads may still return them
    /// (same-epoch read-after-write lag); this set filters the stale hits.
    already_matched: HashSet<String>,
    sessions: Vec<PlayerSession>,
    /// Last `game_type` parameter value observed during the scan; labels
    /// the envelope.
    observed_game_type: i64,
}

pub struct MatchEngine {
    tickets: Arc<dyn TicketStore>,
    indices: Arc<dyn ParameterIndex>,
    sink: Arc<dyn EventSink>,
    cfg: MatchEngineConfig,
    /// Serializes epochs across the scheduled worker and the manual
    /// HTTP trigger; overlapping epochs would double-assign players.
    epoch_lock: Mutex<()>,
}

impl MatchEngine {
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        indices: Arc<dyn ParameterIndex>,
        sink: Arc<dyn EventSink>,
        cfg: MatchEngineConfig,
    ) -> Self {
        Self {
            tickets,
            indices,
            sink,
            cfg,
            epoch_lock: Mutex::new(()),
        }
    }

    /// Run one epoch: scan, match, retire, publish.
    ///
    /// A store failure or per-call timeout aborts the scan, but sessions
    /// already formed are still published before the error propagates;
    /// unprocessed tickets wait for the next epoch.
    pub async fn match_players(&self) -> Result<SessionEnvelope, MatchError> {
        let _epoch = self.epoch_lock.lock().await;
        debug!("matching players");

        let mut state = EpochState {
            already_matched: HashSet::new(),
            sessions: Vec::new(),
            observed_game_type: 0,
        };
        let scan_outcome = self.scan_tickets(&mut state).await;

        let envelope = SessionEnvelope {
            created_sessions: state.sessions,
            game_type: game_type_label(state.observed_game_type).to_string(),
        };
        if !envelope.created_sessions.is_empty() {
            info!(
                sessions = envelope.created_sessions.len(),
                game_type = %envelope.game_type,
                "formed sessions"
            );
            self.publish(&envelope).await;
        }

        scan_outcome?;
        Ok(envelope)
    }

    async fn scan_tickets(&self, state: &mut EpochState) -> Result<(), MatchError> {
        let mut cursor = 0;
        loop {
            let (entries, next_cursor) = self
                .op(self.tickets.scan(
                    &self.cfg.tickets_set_name,
                    cursor,
                    self.cfg.count_per_iteration,
                ))
                .await?;

            for (player_id, ticket) in entries {
                if state.already_matched.contains(&player_id) {
                    continue;
                }
                self.process_ticket(state, ticket).await?;
            }

            if next_cursor == 0 {
                return Ok(());
            }
            cursor = next_cursor;
        }
    }

    async fn process_ticket(
        &self,
        state: &mut EpochState,
        ticket: MatchmakingTicket,
    ) -> Result<(), MatchError> {
        if let Some(game_type) = ticket.game_type() {
            state.observed_game_type = game_type;
        }

        // Expired tickets no longer try to match with anyone.
        if ticket.status == TicketStatus::Expired {
            return Ok(());
        }

        let now = Utc::now().timestamp();
        let has_expired = ticket.has_outlived(self.cfg.timeout, now);

        let eligible = self.collect_eligible(state, &ticket).await?;

        if eligible.len() == self.cfg.max_count_per_match {
            self.form_session(state, &ticket, eligible).await;
        } else if has_expired {
            // Expiry applies only when this epoch found no match: the
            // ticket leaves the indices but stays in the registry until
            // the cleaner takes it.
            self.expire_ticket(ticket).await?;
        }
        Ok(())
    }

    /// Collect opponents compatible on every dimension of the ticket.
    ///
    /// An opponent qualifies once it has been returned by the range query
    /// of each match parameter; collection stops as soon as the session
    /// size is reached.
    async fn collect_eligible(
        &self,
        state: &EpochState,
        ticket: &MatchmakingTicket,
    ) -> Result<Vec<EligiblePlayer>, MatchError> {
        let mut eligible = vec![EligiblePlayer {
            player_id: ticket.player_id.clone(),
            player_username: ticket.player_username.clone(),
        }];
        let mut hits: HashMap<String, usize> = HashMap::new();
        let required = ticket.match_parameters.len();

        'params: for parameter in &ticket.match_parameters {
            let Some(range) = Self::parameter_range(parameter) else {
                debug!(
                    player = %ticket.player_id,
                    dimension = %parameter.param_type,
                    "skipping unsupported not-equal parameter"
                );
                continue;
            };

            let members = self
                .op(self.indices.range_by_score(
                    &parameter.param_type,
                    range,
                    self.cfg.max_count_per_match,
                ))
                .await?;

            for member in members {
                if member.player_id == ticket.player_id
                    || state.already_matched.contains(&member.player_id)
                {
                    continue;
                }
                let count = hits.entry(member.player_id.clone()).or_insert(0);
                *count += 1;
                if *count == required {
                    eligible.push(member.into());
                }
                if eligible.len() == self.cfg.max_count_per_match {
                    break 'params;
                }
            }
        }

        Ok(eligible)
    }

    /// Translate a ticket parameter into a range query over its index.
    ///
    /// Equality on the `game_type` dimension queries the whole randomized
    /// bucket for that value; `<>` has no range form and is skipped.
    fn parameter_range(parameter: &TicketParameter) -> Option<ScoreRange> {
        match parameter.operator {
            ParameterOperator::Equal => {
                if parameter.param_type == scoring::GAME_TYPE {
                    let (min, max) = scoring::bucket_bounds(parameter.value);
                    Some(ScoreRange::closed(min, max))
                } else {
                    Some(ScoreRange::closed(parameter.value, parameter.value))
                }
            }
            ParameterOperator::GreaterThan => Some(ScoreRange::greater_than(parameter.value)),
            ParameterOperator::SmallerThan => Some(ScoreRange::smaller_than(parameter.value)),
            ParameterOperator::NotEqual => None,
        }
    }

    /// Retire every participant and record the session.
    ///
    /// Order matters: registry delete first, then index removals, then the
    /// matches-map record. Individual failures are logged and the next
    /// retirement is still attempted; the session is published either way
    /// (at-least-once), and a later epoch repairs whatever is left behind.
    async fn form_session(
        &self,
        state: &mut EpochState,
        ticket: &MatchmakingTicket,
        eligible: Vec<EligiblePlayer>,
    ) {
        let session_id = Uuid::new_v4().to_string();

        for participant in &eligible {
            if let Err(e) = self
                .op(self
                    .tickets
                    .delete(&self.cfg.tickets_set_name, &participant.player_id))
                .await
            {
                warn!(
                    player = %participant.player_id,
                    error = %e,
                    "failed to retire ticket from registry"
                );
            }
            for parameter in &ticket.match_parameters {
                if let Err(e) = self
                    .op(self
                        .indices
                        .remove(&parameter.param_type, &participant.player_id))
                    .await
                {
                    warn!(
                        player = %participant.player_id,
                        dimension = %parameter.param_type,
                        error = %e,
                        "failed to drop retired player from index"
                    );
                }
            }
            state.already_matched.insert(participant.player_id.clone());

            let mut record = ticket.clone();
            record.player_id = participant.player_id.clone();
            record.player_username = participant.player_username.clone();
            record.status = TicketStatus::Found;
            record.game_session_id = session_id.clone();
            if let Err(e) = self
                .op(self
                    .tickets
                    .put(&self.cfg.matches_set_name, &participant.player_id, &record))
                .await
            {
                warn!(
                    player = %participant.player_id,
                    error = %e,
                    "failed to record session in matches map"
                );
            }
        }

        debug!(session = %session_id, players = eligible.len(), "session formed");
        state.sessions.push(PlayerSession {
            session_id,
            players: eligible,
            game_type: game_type_label(ticket.game_type().unwrap_or(0)).to_string(),
        });
    }

    async fn expire_ticket(&self, mut ticket: MatchmakingTicket) -> Result<(), MatchError> {
        ticket.status = TicketStatus::Expired;
        self.op(self
            .tickets
            .put(&self.cfg.tickets_set_name, &ticket.player_id, &ticket))
            .await?;
        for parameter in &ticket.match_parameters {
            self.op(self.indices.remove(&parameter.param_type, &ticket.player_id))
                .await?;
        }
        debug!(player = %ticket.player_id, "ticket expired");
        Ok(())
    }

    async fn publish(&self, envelope: &SessionEnvelope) {
        let payload = match serde_json::to_vec(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to encode session envelope");
                return;
            }
        };
        if let Err(e) = self.sink.publish(MATCH_FOUND_KEY, payload).await {
            // Matched sessions stay discoverable through the matches map.
            warn!(error = %e, "failed to publish session envelope");
        }
    }

    async fn op<T>(
        &self,
        operation: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, MatchError> {
        match tokio::time::timeout(self.cfg.op_timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MatchError::OpTimedOut(self.cfg.op_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ScoreBound;

    fn parameter(
        param_type: &str,
        operator: ParameterOperator,
        value: f64,
    ) -> TicketParameter {
        TicketParameter {
            param_type: param_type.to_string(),
            operator,
            value,
        }
    }

    #[test]
    fn equality_on_plain_dimensions_is_a_point_range() {
        let range =
            MatchEngine::parameter_range(&parameter("region", ParameterOperator::Equal, 3.0))
                .unwrap();
        assert_eq!(range, ScoreRange::closed(3.0, 3.0));
    }

    #[test]
    fn equality_on_game_type_queries_the_bucket() {
        let normal =
            MatchEngine::parameter_range(&parameter("game_type", ParameterOperator::Equal, 0.0))
                .unwrap();
        assert_eq!(normal, ScoreRange::closed(0.0, 200.0));

        let staked =
            MatchEngine::parameter_range(&parameter("game_type", ParameterOperator::Equal, 1.0))
                .unwrap();
        assert_eq!(staked, ScoreRange::closed(201.0, 402.0));
    }

    #[test]
    fn comparison_operators_map_to_open_ranges() {
        let above =
            MatchEngine::parameter_range(&parameter("league", ParameterOperator::GreaterThan, 5.0))
                .unwrap();
        assert_eq!(above.min, ScoreBound::Exclusive(5.0));
        assert_eq!(above.max, ScoreBound::PosInf);

        let below =
            MatchEngine::parameter_range(&parameter("league", ParameterOperator::SmallerThan, 5.0))
                .unwrap();
        assert_eq!(below.min, ScoreBound::Inclusive(0.0));
        assert_eq!(below.max, ScoreBound::Exclusive(5.0));
    }

    #[test]
    fn not_equal_has_no_range_form() {
        assert!(MatchEngine::parameter_range(&parameter(
            "region",
            ParameterOperator::NotEqual,
            1.0
        ))
        .is_none());
    }
}
