use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use contracts::GameConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime settings for the binary, read from the environment after `.env`.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: SocketAddr,
    pub sqlite_path: String,
    pub seed: u64,
    pub odds_tick_secs: u64,

    pub log_level: String,
    pub log_format: String,
    pub log_color: bool,
}

impl RuntimeConfig {
    /// Game configuration with the environment's seed and tick period applied.
    pub fn game_config(&self) -> GameConfig {
        let mut config = GameConfig::default();
        config.seed = self.seed;
        config.odds_tick_secs = self.odds_tick_secs;
        config
    }
}

pub fn load() -> Result<RuntimeConfig> {
    let _ = dotenvy::dotenv();
    let defaults = GameConfig::default();

    let bind_raw = env_str("HUNT_BIND_ADDR", Some(DEFAULT_BIND_ADDR.to_string()))
        .context("HUNT_BIND_ADDR must be set")?;
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .with_context(|| format!("HUNT_BIND_ADDR is not a socket address: {bind_raw}"))?;

    let sqlite_path = hunt_api::default_sqlite_path();
    let seed = env_u64("HUNT_SEED", Some(defaults.seed)).context("HUNT_SEED must be a u64")?;
    let odds_tick_secs = env_u64("HUNT_ODDS_TICK_SECS", Some(defaults.odds_tick_secs))
        .context("HUNT_ODDS_TICK_SECS must be a u64")?;

    let log_level = env_str("HUNT_LOG_LEVEL", Some("info".to_string()))
        .context("HUNT_LOG_LEVEL must be set")?;
    let log_format = env_str("HUNT_LOG_FORMAT", Some("pretty".to_string()))
        .context("HUNT_LOG_FORMAT must be set")?;
    let log_color = env_bool("HUNT_LOG_COLOR", Some(true)).context("HUNT_LOG_COLOR must be a bool")?;

    Ok(RuntimeConfig {
        bind_addr,
        sqlite_path,
        seed,
        odds_tick_secs,
        log_level,
        log_format,
        log_color,
    })
}

fn env_str(key: &str, default: Option<String>) -> Option<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or(default)
}

// A set but unparsable value yields None so the caller reports it.
fn env_u64(key: &str, default: Option<u64>) -> Option<u64> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().parse().ok(),
        _ => default,
    }
}

fn env_bool(key: &str, default: Option<bool>) -> Option<bool> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_lowercase().parse().ok(),
        _ => default,
    }
}
