//! Cleaner worker
//!
//! Periodic job that removes aged tickets from the registry, whatever their
//! status. It never touches the parameter indices; the match worker has
//! already purged expired tickets from those.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::error::TicketError;
use crate::store::TicketStore;

#[derive(Debug, Clone)]
pub struct CleanerConfig {
    pub tickets_set_name: String,
    /// Age past which a ticket is removed. Must be at least the matchmaker
    /// timeout so the match worker sees the expiry transition first.
    pub time_before_to_remove: Duration,
    /// Scan page size.
    pub count_per_iteration: u64,
    /// Interval between cleanup passes.
    pub schedule: Duration,
}

pub struct CleanerWorker {
    tickets: Arc<dyn TicketStore>,
    cfg: CleanerConfig,
}

impl CleanerWorker {
    pub fn new(tickets: Arc<dyn TicketStore>, cfg: CleanerConfig) -> Self {
        Self { tickets, cfg }
    }

    /// Run the cleanup loop. Passes are awaited inline, so a slow pass
    /// swallows the ticks it overlaps instead of piling up.
    pub async fn run(&self) -> ! {
        info!(
            schedule_secs = self.cfg.schedule.as_secs(),
            remove_after_secs = self.cfg.time_before_to_remove.as_secs(),
            "starting ticket cleaner"
        );

        let mut ticker = interval(self.cfg.schedule);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.remove_expired_tickets().await {
                Ok(0) => debug!("cleanup pass removed nothing"),
                Ok(removed) => info!(removed, "cleanup pass removed aged tickets"),
                Err(e) => error!(error = %e, "cleanup pass aborted"),
            }
        }
    }

    /// One full cleanup pass. Victims are collected over the whole scan
    /// before any deletion so page offsets stay stable; re-running the pass
    /// on an unchanged registry is a no-op.
    pub async fn remove_expired_tickets(&self) -> Result<u64, TicketError> {
        let now = Utc::now().timestamp();
        let mut victims = Vec::new();
        let mut cursor = 0;
        loop {
            let (entries, next_cursor) = self
                .tickets
                .scan(&self.cfg.tickets_set_name, cursor, self.cfg.count_per_iteration)
                .await?;
            for (player_id, ticket) in entries {
                if ticket.has_outlived(self.cfg.time_before_to_remove, now) {
                    victims.push(player_id);
                }
            }
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }

        let mut removed = 0;
        for player_id in victims {
            if self
                .tickets
                .delete(&self.cfg.tickets_set_name, &player_id)
                .await?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
