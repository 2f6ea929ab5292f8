use std::sync::Arc;

use crate::matchmaker::MatchEngine;
use crate::ticket::TicketService;

/// Shared gateway state.
#[derive(Clone)]
pub struct AppState {
    pub tickets: Arc<TicketService>,
    pub matchmaker: Arc<MatchEngine>,
}

impl AppState {
    pub fn new(tickets: Arc<TicketService>, matchmaker: Arc<MatchEngine>) -> Self {
        Self {
            tickets,
            matchmaker,
        }
    }
}
