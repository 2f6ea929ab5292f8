use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use matchforge::config::AppConfig;
use matchforge::gateway::{self, AppState};
use matchforge::logging;
use matchforge::matchmaker::{MatchEngine, MatchEngineConfig, MatchWorker, MATCHMAKING_TOPIC};
use matchforge::store::memory::{BroadcastEventSink, MemoryStore};
use matchforge::store::{EventSink, ParameterIndex, TicketStore};
use matchforge::ticket::{CleanerConfig, CleanerWorker, TicketService, TicketServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::args().nth(1).unwrap_or_else(|| "dev".to_string());
    let config = AppConfig::load(&env)?;
    let _log_guard = logging::init_logging(&config);
    info!(env = %env, version = env!("GIT_HASH"), "starting matchforge");

    let store = Arc::new(MemoryStore::new());
    let tickets: Arc<dyn TicketStore> = store.clone();
    let indices: Arc<dyn ParameterIndex> = store;
    let sink: Arc<dyn EventSink> = Arc::new(BroadcastEventSink::new(1024));
    info!(topic = MATCHMAKING_TOPIC, "session events go to the in-process broadcast sink");

    let ticket_service = Arc::new(TicketService::new(
        tickets.clone(),
        indices.clone(),
        TicketServiceConfig {
            tickets_set_name: config.matchmaker.tickets_set_name.clone(),
            matches_set_name: config.matchmaker.matches_set_name.clone(),
        },
    ));

    let engine = Arc::new(MatchEngine::new(
        tickets.clone(),
        indices,
        sink,
        MatchEngineConfig {
            tickets_set_name: config.matchmaker.tickets_set_name.clone(),
            matches_set_name: config.matchmaker.matches_set_name.clone(),
            max_count_per_match: config.matchmaker.max_players_per_session as usize,
            timeout: Duration::from_secs(config.matchmaker.timeout_secs),
            count_per_iteration: config.matchmaker.count_per_iteration,
            op_timeout: Duration::from_millis(config.matchmaker.op_timeout_millis),
        },
    ));

    let match_worker = MatchWorker::new(
        engine.clone(),
        Duration::from_secs(config.matchmaker.worker_schedule_secs),
    );
    tokio::spawn(async move { match_worker.run().await });

    let cleaner = CleanerWorker::new(
        tickets,
        CleanerConfig {
            tickets_set_name: config.matchmaker.tickets_set_name.clone(),
            time_before_to_remove: Duration::from_secs(config.cleaner.time_before_to_remove_secs),
            count_per_iteration: config.matchmaker.count_per_iteration,
            schedule: Duration::from_secs(config.cleaner.schedule_secs),
        },
    );
    tokio::spawn(async move { cleaner.run().await });

    let state = Arc::new(AppState::new(ticket_service, engine));
    gateway::run_server(&config.gateway.host, config.gateway.port, state).await
}
