//! Server configuration.
//!
//! Values come from the command line (with environment fallbacks, see
//! `bin/server.rs`) and are validated once before the server starts.

use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;

use crate::domain::GridSize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_COOLDOWN_MS: u64 = 30_000;
pub const DEFAULT_GRID_SIZE: u32 = 1000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://grid.db";
pub const DEFAULT_COOLDOWN_RETENTION_MS: u64 = 300_000;
pub const DEFAULT_COOLDOWN_SWEEP_INTERVAL_MS: u64 = 60_000;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("grid size must be greater than zero")]
    ZeroGridSize,

    #[error("cooldown sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("unknown persist strategy '{0}' (expected 'upsert' or 'full-rewrite')")]
    UnknownPersistStrategy(String),

    #[error("unknown transport '{0}' (expected 'websocket' or 'http')")]
    UnknownTransport(String),
}

/// How a placement is written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistStrategy {
    /// insert-or-replace of the changed cell only
    #[default]
    Upsert,
    /// delete every row and reinsert the whole grid in one transaction
    FullRewrite,
}

impl FromStr for PersistStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert" => Ok(Self::Upsert),
            "full-rewrite" => Ok(Self::FullRewrite),
            other => Err(ConfigError::UnknownPersistStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for PersistStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upsert => f.write_str("upsert"),
            Self::FullRewrite => f.write_str("full-rewrite"),
        }
    }
}

/// What the listening port answers besides WebSocket upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// upgrades only
    WebSocket,
    /// upgrades plus plain HTTP liveness responses
    #[default]
    Http,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "websocket" => Ok(Self::WebSocket),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebSocket => f.write_str("websocket"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Validated server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub listen_port: u16,
    pub cooldown_ms: u64,
    pub grid_size: GridSize,
    pub database_url: String,
    pub persist_strategy: PersistStrategy,
    pub transport: TransportMode,
    pub cooldown_retention_ms: u64,
    pub cooldown_sweep_interval_ms: u64,
}

/// Unvalidated configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawServerConfig {
    pub host: String,
    pub listen_port: u16,
    pub cooldown_ms: u64,
    pub grid_size: u32,
    pub database_url: String,
    pub persist_strategy: PersistStrategy,
    pub transport: TransportMode,
    pub cooldown_retention_ms: u64,
    pub cooldown_sweep_interval_ms: u64,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            listen_port: DEFAULT_PORT,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            grid_size: DEFAULT_GRID_SIZE,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            persist_strategy: PersistStrategy::default(),
            transport: TransportMode::default(),
            cooldown_retention_ms: DEFAULT_COOLDOWN_RETENTION_MS,
            cooldown_sweep_interval_ms: DEFAULT_COOLDOWN_SWEEP_INTERVAL_MS,
        }
    }
}

impl TryFrom<RawServerConfig> for ServerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawServerConfig) -> Result<Self, Self::Error> {
        let grid_size = GridSize::new(raw.grid_size).ok_or(ConfigError::ZeroGridSize)?;
        if raw.cooldown_sweep_interval_ms == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }

        Ok(Self {
            host: raw.host,
            listen_port: raw.listen_port,
            cooldown_ms: raw.cooldown_ms,
            grid_size,
            database_url: raw.database_url,
            persist_strategy: raw.persist_strategy,
            transport: raw.transport,
            cooldown_retention_ms: raw.cooldown_retention_ms,
            cooldown_sweep_interval_ms: raw.cooldown_sweep_interval_ms,
        })
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.listen_port)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cooldown_sweep_interval_ms)
    }
}
