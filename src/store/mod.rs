//! Persistence seams
//!
//! The engine never talks to a concrete database. It is written against
//! three traits: [`TicketStore`] (the flat `player_id -> ticket` registry,
//! also used for the matches map), [`ParameterIndex`] (one sorted
//! score index per parameter type), and [`EventSink`] (the downstream
//! notification bus). [`memory`] provides the in-process reference
//! implementations used by the default binary and the test suite.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::models::MatchmakingTicket;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("stored payload could not be decoded: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("index score must be a finite number")]
    InvalidScore,
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// One end of a score range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    NegInf,
    Inclusive(f64),
    Exclusive(f64),
    PosInf,
}

/// A typed `[min, max]` interval over index scores, with the open/closed
/// and infinite bound conventions of a sorted-score store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: ScoreBound,
    pub max: ScoreBound,
}

impl ScoreRange {
    /// `[min, max]`, both ends included.
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min: ScoreBound::Inclusive(min),
            max: ScoreBound::Inclusive(max),
        }
    }

    /// `(value, +inf]`, the `>` operator.
    pub fn greater_than(value: f64) -> Self {
        Self {
            min: ScoreBound::Exclusive(value),
            max: ScoreBound::PosInf,
        }
    }

    /// `[0, value)`, the `<` operator. Scores are non-negative by
    /// convention, so the lower end is pinned at zero.
    pub fn smaller_than(value: f64) -> Self {
        Self {
            min: ScoreBound::Inclusive(0.0),
            max: ScoreBound::Exclusive(value),
        }
    }

    pub fn contains(&self, score: f64) -> bool {
        let above_min = match self.min {
            ScoreBound::NegInf => true,
            ScoreBound::Inclusive(v) => score >= v,
            ScoreBound::Exclusive(v) => score > v,
            ScoreBound::PosInf => false,
        };
        let below_max = match self.max {
            ScoreBound::NegInf => false,
            ScoreBound::Inclusive(v) => score <= v,
            ScoreBound::Exclusive(v) => score < v,
            ScoreBound::PosInf => true,
        };
        above_min && below_max
    }
}

/// Index member payload: the richer `{player, username}` pair, so session
/// events can carry usernames without a second registry read. The write
/// side ([`ParameterIndex::add`]) and the read side agree on this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMember {
    #[serde(rename = "PlayerId")]
    pub player_id: String,
    #[serde(rename = "PlayerUsername")]
    pub player_username: String,
}

/// A member together with its score, as written at ticket creation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub member: IndexMember,
    pub score: f64,
}

/// Flat map namespace `player_id -> ticket`. Backs both the ticket
/// registry and the matches map (distinct `set` names).
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Unconditional upsert.
    async fn put(
        &self,
        set: &str,
        player_id: &str,
        ticket: &MatchmakingTicket,
    ) -> Result<(), StoreError>;

    async fn get(&self, set: &str, player_id: &str)
        -> Result<Option<MatchmakingTicket>, StoreError>;

    /// Idempotent removal; returns whether the entry was present.
    async fn delete(&self, set: &str, player_id: &str) -> Result<bool, StoreError>;

    /// Paginated, non-snapshot iteration. A returned cursor of zero
    /// terminates the scan. Concurrent mutation may cause an entry to be
    /// seen twice or missed; callers must not assume linearizability
    /// across pages.
    async fn scan(
        &self,
        set: &str,
        cursor: u64,
        count: u64,
    ) -> Result<(Vec<(String, MatchmakingTicket)>, u64), StoreError>;
}

/// One sorted index per parameter type, scored by `f64`.
#[async_trait]
pub trait ParameterIndex: Send + Sync {
    async fn add(&self, index: &str, entry: IndexEntry) -> Result<(), StoreError>;

    /// At most `limit` members whose score falls in `range`, ordered by
    /// ascending `(score, player_id)` so ties break deterministically.
    async fn range_by_score(
        &self,
        index: &str,
        range: ScoreRange,
        limit: usize,
    ) -> Result<Vec<IndexMember>, StoreError>;

    async fn remove(&self, index: &str, player_id: &str) -> Result<bool, StoreError>;
}

/// Downstream notification bus. One logical topic, fixed at construction;
/// delivery is best-effort at-least-once.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, key: &str, payload: Vec<u8>) -> Result<(), SinkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range_includes_both_ends() {
        let r = ScoreRange::closed(1.0, 2.0);
        assert!(r.contains(1.0));
        assert!(r.contains(2.0));
        assert!(!r.contains(0.999));
        assert!(!r.contains(2.001));
    }

    #[test]
    fn greater_than_excludes_the_pivot() {
        let r = ScoreRange::greater_than(5.0);
        assert!(!r.contains(5.0));
        assert!(r.contains(5.000_001));
        assert!(r.contains(f64::MAX));
    }

    #[test]
    fn smaller_than_is_zero_floored_and_open_above() {
        let r = ScoreRange::smaller_than(3.0);
        assert!(r.contains(0.0));
        assert!(r.contains(2.999));
        assert!(!r.contains(3.0));
        assert!(!r.contains(-0.1));
    }
}
