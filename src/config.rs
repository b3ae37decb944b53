//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparsable values fall back
//! to defaults; only `LISTEN_ADDR` is validated strictly.

use std::net::SocketAddr;
use std::time::Duration;

use crate::service::SchedulerConfig;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Configuration errors that prevent startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is not a socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    ListenAddr {
        /// Offending value.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// SQLite connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Lobby listing endpoint.
    pub source_url: String,

    /// Mod whose sessions are kept.
    pub source_mod: String,

    /// Whole-request timeout for the listing and webhook calls.
    pub source_timeout: Duration,

    /// Sleep between successful ticks.
    pub poll_interval: Duration,

    /// Sleep after a failed tick.
    pub poll_backoff: Duration,

    /// Persist a snapshot on every Nth tick.
    pub persist_every_ticks: u64,

    /// Run hourly aggregation on every Mth tick.
    pub aggregate_every_ticks: u64,

    /// Webhook for reminder notifications. When unset, notifications go to
    /// the WebSocket feed.
    pub notify_webhook_url: Option<String>,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Zero intervals and tick counts are raised to one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ListenAddr`] if `LISTEN_ADDR` is set but
    /// cannot be parsed as a [`SocketAddr`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::ListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://lobbywatch.db?mode=rwc".to_string());
        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 5_u32).max(1);

        let source_url = std::env::var("SOURCE_URL").unwrap_or_else(|_| {
            "https://master.openra.net/games?protocol=2&type=json".to_string()
        });
        let source_mod = std::env::var("SOURCE_MOD").unwrap_or_else(|_| "ca".to_string());
        let source_timeout = parse_secs("SOURCE_TIMEOUT_SECS", 10);

        let poll_interval = parse_secs("POLL_INTERVAL_SECS", 30);
        let poll_backoff = parse_secs("POLL_BACKOFF_SECS", 300);
        let persist_every_ticks = parse_env("PERSIST_EVERY_TICKS", 2_u64).max(1);
        let aggregate_every_ticks = parse_env("AGGREGATE_EVERY_TICKS", 120_u64).max(1);

        let notify_webhook_url = std::env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 1_024_usize).max(1);
        let log_format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            source_url,
            source_mod,
            source_timeout,
            poll_interval,
            poll_backoff,
            persist_every_ticks,
            aggregate_every_ticks,
            notify_webhook_url,
            event_bus_capacity,
            log_format,
        })
    }

    /// The scheduler's share of the configuration.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            poll_interval: self.poll_interval,
            backoff: self.poll_backoff,
            persist_every: self.persist_every_ticks,
            aggregate_every: self.aggregate_every_ticks,
            mod_filter: self.source_mod.clone(),
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parses a whole number of seconds, clamped to at least one.
fn parse_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(parse_env(key, default).max(1))
}
