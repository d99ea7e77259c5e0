//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Messaging configuration.
    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// How a compose call writes its per-recipient rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Rows are written one by one with no transaction. A failure on the
    /// k-th recipient leaves the first k-1 rows in place and skips the rest.
    #[default]
    BestEffort,
    /// The whole fan-out runs in a single transaction and is rolled back on
    /// any failure. Notifications are sent only after commit.
    Atomic,
}

/// Messaging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagingConfig {
    /// Fan-out write policy.
    #[serde(default)]
    pub fan_out: FanOutPolicy,
    /// Whether stored notices are written for message events.
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Upper bound for inbox/outbox page sizes.
    #[serde(default = "default_inbox_limit")]
    pub inbox_limit: u64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            fan_out: FanOutPolicy::default(),
            notifications: true,
            inbox_limit: default_inbox_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

const fn default_inbox_limit() -> u64 {
    50
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `CAMPUS_ENV`)
    /// 4. Environment variables with `CAMPUS__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("CAMPUS_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CAMPUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("CAMPUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.messaging.inbox_limit == 0 {
            return Err(config::ConfigError::Message(
                "messaging.inbox_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
