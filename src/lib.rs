//! Matchforge - index-driven matchmaking service
//!
//! Players open tickets describing the session they want; periodic workers
//! group compatible tickets into sessions and notify downstream consumers.
//!
//! # Modules
//!
//! - [`ticket`] - Ticket model, ingestion operations, cleaner worker
//! - [`matchmaker`] - The epoch engine and its periodic worker
//! - [`store`] - Abstract registry/index/sink seams + in-memory backends
//! - [`gateway`] - HTTP surface (axum)
//! - [`config`] - YAML + env configuration
//! - [`logging`] - tracing setup

pub mod config;
pub mod gateway;
pub mod logging;
pub mod matchmaker;
pub mod store;
pub mod ticket;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use matchmaker::{MatchEngine, MatchEngineConfig, MatchWorker, SessionEnvelope};
pub use store::memory::{BroadcastEventSink, MemoryEventSink, MemoryStore};
pub use ticket::{CleanerWorker, MatchmakingTicket, TicketService, TicketStatus};
