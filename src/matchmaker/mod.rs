//! Matchmaking engine and its periodic worker
//!
//! [`engine`] holds the epoch algorithm: scan the registry, fan out into
//! the parameter indices, retire matched tickets, publish one session
//! envelope. [`worker`] schedules epochs; [`events`] is the published wire
//! shape.
//!
//! # Ordering contract
//!
//! Within an epoch, tickets are processed in scan order and earlier tickets
//! win contested opponents. Across epochs the only guarantee is monotonic:
//! once a ticket is found or deleted it is never re-matched.

pub mod engine;
pub mod error;
pub mod events;
pub mod worker;

pub use engine::{MatchEngine, MatchEngineConfig};
pub use error::MatchError;
pub use events::{
    game_type_label, EligiblePlayer, PlayerSession, SessionEnvelope, MATCHMAKING_TOPIC,
    MATCH_FOUND_KEY,
};
pub use worker::MatchWorker;
