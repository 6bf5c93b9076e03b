//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::{
    rate_limits, DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_QUESTION_POINTS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, DEFAULT_STORE_TIMEOUT_MS,
    DEFAULT_SWEEP_BATCH_SIZE, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TEST_DURATION_MINUTES,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub attempts: AttemptConfig,
    pub sweeper: SweeperConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Bearer token verification
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

/// Attempt lifecycle and scoring policy
#[derive(Debug, Clone)]
pub struct AttemptConfig {
    /// Points used when a catalog row carries no positive point value
    pub default_question_points: i64,
    /// Duration used when a test has no positive time limit
    pub default_duration_minutes: i64,
    /// Upper bound on each store call
    pub store_timeout_ms: u64,
    pub trial_runs_per_minute: i64,
    pub scored_submits_per_minute: i64,
}

/// Server-side deadline sweep
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between sweeps; 0 disables the sweeper
    pub interval_secs: u64,
    pub batch_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            attempts: AttemptConfig::from_env()?,
            sweeper: SweeperConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_or("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required("DATABASE_URL")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
            acquire_timeout_secs: parse_or(
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS,
            )?,
        })
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required("JWT_SECRET")?,
        })
    }
}

impl AttemptConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            default_question_points: parse_or("DEFAULT_QUESTION_POINTS", DEFAULT_QUESTION_POINTS)?,
            default_duration_minutes: parse_or(
                "DEFAULT_TEST_DURATION_MINUTES",
                DEFAULT_TEST_DURATION_MINUTES,
            )?,
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", DEFAULT_STORE_TIMEOUT_MS)?,
            trial_runs_per_minute: parse_or(
                "TRIAL_RUNS_PER_MINUTE",
                rate_limits::TRIAL_RUNS_PER_WINDOW,
            )?,
            scored_submits_per_minute: parse_or(
                "SCORED_SUBMITS_PER_MINUTE",
                rate_limits::SCORED_SUBMITS_PER_WINDOW,
            )?,
        };

        if config.default_question_points <= 0 {
            return Err(ConfigError::InvalidValue("DEFAULT_QUESTION_POINTS".to_string()));
        }
        if config.default_duration_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_TEST_DURATION_MINUTES".to_string(),
            ));
        }
        if config.store_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("STORE_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// Store call bound as a `Duration`
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            default_question_points: DEFAULT_QUESTION_POINTS,
            default_duration_minutes: DEFAULT_TEST_DURATION_MINUTES,
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            trial_runs_per_minute: rate_limits::TRIAL_RUNS_PER_WINDOW,
            scored_submits_per_minute: rate_limits::SCORED_SUBMITS_PER_WINDOW,
        }
    }
}

impl SweeperConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let batch_size = parse_or("SWEEP_BATCH_SIZE", DEFAULT_SWEEP_BATCH_SIZE)?;
        if batch_size <= 0 {
            return Err(ConfigError::InvalidValue("SWEEP_BATCH_SIZE".to_string()));
        }

        Ok(Self {
            interval_secs: parse_or("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?,
            batch_size,
        })
    }

    /// Whether the background sweep should run at all
    pub fn is_enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

fn parse_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
