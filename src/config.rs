use serde::{Deserialize, Serialize};
use std::fs;

use anyhow::{Context, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub matchmaker: MatchmakerSettings,
    pub cleaner: CleanerSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchmakerSettings {
    /// Registry namespace for open tickets.
    pub tickets_set_name: String,
    /// Namespace for finished sessions, keyed by participant.
    pub matches_set_name: String,
    /// Registry scan page size.
    pub count_per_iteration: u64,
    /// Reserved for the disabled session-size softening path.
    pub min_players_per_session: u32,
    pub max_players_per_session: u32,
    /// Pending lifetime before a ticket expires.
    pub timeout_secs: u64,
    /// Tick interval of the match worker.
    pub worker_schedule_secs: u64,
    /// Deadline for each individual store call inside an epoch.
    pub op_timeout_millis: u64,
}

impl Default for MatchmakerSettings {
    fn default() -> Self {
        Self {
            tickets_set_name: "matchmaking_tickets".to_string(),
            matches_set_name: "matchmaking_matches".to_string(),
            count_per_iteration: 50,
            min_players_per_session: 2,
            max_players_per_session: 2,
            timeout_secs: 60,
            worker_schedule_secs: 10,
            op_timeout_millis: 2_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CleanerSettings {
    /// Ticket age before the cleaner removes it, whatever the status.
    pub time_before_to_remove_secs: u64,
    pub schedule_secs: u64,
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            time_before_to_remove_secs: 300,
            schedule_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load config from a YAML file based on environment.
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config: Self =
            serde_yaml::from_str(&content).context("Failed to parse config yaml")?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Environment variables take precedence over YAML config:
    /// - MF_GATEWAY_HOST / MF_GATEWAY_PORT
    /// - MF_LOG_LEVEL
    /// - MF_MATCHMAKER_TIMEOUT_SECS
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("MF_GATEWAY_HOST") {
            tracing::info!("Config override: gateway.host = {} (from MF_GATEWAY_HOST)", host);
            self.gateway.host = host;
        }
        if let Ok(port) = std::env::var("MF_GATEWAY_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                tracing::info!("Config override: gateway.port = {} (from MF_GATEWAY_PORT)", p);
                self.gateway.port = p;
            }
        }
        if let Ok(level) = std::env::var("MF_LOG_LEVEL") {
            tracing::info!("Config override: log_level = {} (from MF_LOG_LEVEL)", level);
            self.log_level = level;
        }
        if let Ok(timeout) = std::env::var("MF_MATCHMAKER_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse::<u64>() {
                tracing::info!(
                    "Config override: matchmaker.timeout_secs = {} (from MF_MATCHMAKER_TIMEOUT_SECS)",
                    t
                );
                self.matchmaker.timeout_secs = t;
            }
        }
    }

    /// Validate configuration at startup.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.port == 0 {
            anyhow::bail!("Invalid gateway.port: must be > 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log_level '{}': must be one of {:?}",
                self.log_level,
                valid_levels
            );
        }

        if self.matchmaker.count_per_iteration == 0 {
            anyhow::bail!("Invalid matchmaker.count_per_iteration: must be > 0");
        }
        if self.matchmaker.max_players_per_session < 2 {
            anyhow::bail!("Invalid matchmaker.max_players_per_session: must be >= 2");
        }
        if self.matchmaker.min_players_per_session > self.matchmaker.max_players_per_session {
            anyhow::bail!(
                "Invalid matchmaker.min_players_per_session: must not exceed max_players_per_session"
            );
        }
        if self.matchmaker.worker_schedule_secs == 0 {
            anyhow::bail!("Invalid matchmaker.worker_schedule_secs: must be > 0");
        }
        if self.cleaner.time_before_to_remove_secs < self.matchmaker.timeout_secs {
            anyhow::bail!(
                "Invalid cleaner.time_before_to_remove_secs: must be >= matchmaker.timeout_secs \
                 so the match worker observes expiry before removal"
            );
        }

        Ok(())
    }
}
