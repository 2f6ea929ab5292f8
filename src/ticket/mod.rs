//! Tickets: data model, ingestion operations, and the cleaner worker
//!
//! The registry (a flat `player_id -> ticket` map) is the single source of
//! truth for ticket existence and status. Ingestion writes it first and then
//! scores the player into the parameter indices; the cleaner removes aged
//! tickets from it on a schedule.

pub mod cleaner;
pub mod error;
pub mod models;
pub mod scoring;
pub mod service;

pub use cleaner::{CleanerConfig, CleanerWorker};
pub use error::TicketError;
pub use models::{
    MatchmakingTicket, ParameterOperator, PlayerParameter, TicketParameter, TicketStatus,
};
pub use service::{CreateTicketInput, TicketService, TicketServiceConfig};
