use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Server settings, read from the environment (and `.env` if present)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub board_idle_timeout: Duration,
    pub sweep_interval: Duration,
    pub session_ttl: Duration,
    pub participation_ttl: Duration,
    pub seed_demo_players: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8080)?,
            board_idle_timeout: parse_duration("BOARD_IDLE_MINUTES", 30, 60)?,
            sweep_interval: Duration::from_secs(parse_var("SWEEP_INTERVAL_SECS", 60)?),
            session_ttl: parse_duration("SESSION_TTL_HOURS", 24, 60 * 60)?,
            participation_ttl: Duration::from_secs(parse_var("PARTICIPATION_TTL_SECS", 300)?),
            seed_demo_players: parse_var("SEED_DEMO_PLAYERS", false)?,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            board_idle_timeout: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            participation_ttl: Duration::from_secs(300),
            seed_demo_players: false,
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

/// Read a count of `unit_secs`-long units, rejecting totals that overflow.
fn parse_duration(key: &'static str, default: u64, unit_secs: u64) -> Result<Duration, ConfigError> {
    let units = parse_var(key, default)?;
    units
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid {
            key,
            value: units.to_string(),
        })
}
