//! Skill configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_API_URL` - Base URL of the grocery commerce API
//!
//! ## Optional
//! - `SKILL_HOST` - Bind address (default: 127.0.0.1)
//! - `SKILL_PORT` - Listen port (default: 3000)
//! - `COMMERCE_TIMEOUT_SECS` - Per-request timeout for commerce calls (default: 15)
//! - `SESSION_CAPACITY` - Maximum live conversations kept in memory (default: 10000)
//! - `SESSION_IDLE_SECS` - Idle time after which a conversation is forgotten (default: 3600)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Skill application configuration.
#[derive(Debug, Clone)]
pub struct SkillConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Commerce API configuration
    pub commerce: CommerceConfig,
    /// Conversation registry bounds
    pub sessions: SessionConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<SecretString>,
    /// Sentry environment name (e.g., production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Commerce API configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// Base URL, e.g. `https://api.grocer.example`
    pub base_url: Url,
    /// Timeout applied to each request
    pub timeout: Duration,
}

/// Conversation registry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of live conversations
    pub capacity: u64,
    /// A conversation untouched for this long is evicted
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            idle_timeout: Duration::from_secs(3600),
        }
    }
}

impl SkillConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("SKILL_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SKILL_PORT", "3000")?;

        let commerce = CommerceConfig::from_env()?;
        let sessions = SessionConfig::from_env()?;

        Ok(Self {
            host,
            port,
            commerce,
            sessions,
            sentry_dsn: get_optional_env("SENTRY_DSN").map(SecretString::from),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Defaults for everything except the commerce API location; no Sentry.
    #[must_use]
    pub fn with_commerce_url(base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            commerce: CommerceConfig {
                base_url,
                timeout: Duration::from_secs(15),
            },
            sessions: SessionConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl CommerceConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("COMMERCE_API_URL")?;
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("COMMERCE_API_URL".to_string(), e.to_string())
        })?;
        let timeout_secs = parse_env_or_default::<u64>("COMMERCE_TIMEOUT_SECS", "15")?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let capacity = parse_env_or_default::<u64>("SESSION_CAPACITY", "10000")?;
        let idle_secs = parse_env_or_default::<u64>("SESSION_IDLE_SECS", "3600")?;

        if capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to a default literal.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
