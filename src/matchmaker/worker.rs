//! Match worker - periodic epoch scheduler
//!
//! Fires an epoch on a fixed schedule. Epochs are awaited inline and the
//! ticker skips missed ticks, so a long epoch finishes and swallows the
//! ticks it overlapped instead of stacking overlapping scans.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use super::engine::MatchEngine;

pub struct MatchWorker {
    engine: Arc<MatchEngine>,
    schedule: Duration,
}

impl MatchWorker {
    pub fn new(engine: Arc<MatchEngine>, schedule: Duration) -> Self {
        Self { engine, schedule }
    }

    pub async fn run(&self) -> ! {
        info!(
            schedule_secs = self.schedule.as_secs(),
            "starting match worker"
        );

        let mut ticker = interval(self.schedule);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match self.engine.match_players().await {
                Ok(envelope) if envelope.created_sessions.is_empty() => {
                    debug!("epoch formed no sessions");
                }
                Ok(envelope) => {
                    info!(sessions = envelope.created_sessions.len(), "epoch complete");
                }
                Err(e) => {
                    error!(error = %e, "match epoch aborted; next tick retries");
                }
            }
        }
    }
}
