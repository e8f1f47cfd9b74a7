//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HOMEGRID_DATABASE_URL` - `PostgreSQL` connection string
//! - `HOMEGRID_BASE_URL` - Public URL for the storefront
//! - `HOMEGRID_SESSION_SECRET` - Session signing secret (min 32 chars)
//! - `STRIPE_SECRET_KEY` - Stripe API secret key
//! - `STRIPE_WEBHOOK_SECRET` - Stripe webhook signing secret
//! - `HOMEGRID_ADMIN_API_KEY` - Shared key for admin maintenance endpoints
//!
//! ## Optional
//! - `HOMEGRID_HOST` - Bind address (default: 127.0.0.1)
//! - `HOMEGRID_PORT` - Listen port (default: 3000)
//! - `OPENAI_API_KEY` - Enables AI content/recommendation generation
//! - `OPENAI_MODEL` - Model name (default: gpt-4o-mini)
//! - `OPENAI_BASE_URL` - API base URL (default: <https://api.openai.com/v1>)
//! - `HOMEGRID_SIMULATE_JOBS` - Enables randomized stock/availability drift
//!   in maintenance jobs (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Payment gateway configuration
    pub stripe: StripeConfig,
    /// AI generation configuration, absent when `OPENAI_API_KEY` is unset
    pub openai: Option<OpenAiConfig>,
    /// Shared key for admin maintenance endpoints
    pub admin_api_key: SecretString,
    /// Maintenance job behaviour
    pub jobs: JobSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct StripeConfig {
    /// API secret key (server-side only)
    pub secret_key: SecretString,
    /// Webhook signing secret
    pub webhook_secret: SecretString,
    /// Accepted age of a signed webhook timestamp, in seconds
    pub webhook_tolerance_secs: i64,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("webhook_tolerance_secs", &self.webhook_tolerance_secs)
            .finish()
    }
}

/// `OpenAI` API configuration.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key
    pub api_key: SecretString,
    /// Model name (e.g., gpt-4o-mini)
    pub model: String,
    /// API base URL
    pub base_url: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Maintenance job settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobSettings {
    /// When true, stock-adjust and availability-flip steps apply random
    /// drift. Off by default so job runs are deterministic.
    pub simulate: bool,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("HOMEGRID_DATABASE_URL")?;
        let host = get_env_or_default("HOMEGRID_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOMEGRID_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("HOMEGRID_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOMEGRID_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("HOMEGRID_BASE_URL")?;
        let session_secret = get_required_secret("HOMEGRID_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "HOMEGRID_SESSION_SECRET")?;

        let stripe = StripeConfig::from_env()?;
        let openai = OpenAiConfig::from_env();
        let admin_api_key = get_required_secret("HOMEGRID_ADMIN_API_KEY")?;
        let jobs = JobSettings {
            simulate: get_env_or_default("HOMEGRID_SIMULATE_JOBS", "false") == "true",
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            stripe,
            openai,
            admin_api_key,
            jobs,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let webhook_tolerance_secs = get_env_or_default("STRIPE_WEBHOOK_TOLERANCE_SECS", "300")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STRIPE_WEBHOOK_TOLERANCE_SECS".to_string(), e.to_string())
            })?;
        Ok(Self {
            secret_key: get_required_secret("STRIPE_SECRET_KEY")?,
            webhook_secret: get_required_secret("STRIPE_WEBHOOK_SECRET")?,
            webhook_tolerance_secs,
        })
    }
}

impl OpenAiConfig {
    fn from_env() -> Option<Self> {
        let api_key = get_optional_env("OPENAI_API_KEY")?;
        Some(Self {
            api_key: SecretString::from(api_key),
            model: get_env_or_default("OPENAI_MODEL", "gpt-4o-mini"),
            base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
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

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements and is
/// not an obvious placeholder.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_SESSION_SECRET_LENGTH} characters"),
        ));
    }
    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("looks like a placeholder (contains {pattern:?})"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_session_secret_is_rejected() {
        let secret = SecretString::from("too-short");
        assert!(validate_session_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn placeholder_session_secret_is_rejected() {
        let secret = SecretString::from("changeme-changeme-changeme-changeme-0000");
        assert!(validate_session_secret(&secret, "TEST").is_err());
    }

    #[test]
    fn strong_session_secret_is_accepted() {
        let secret = SecretString::from("kQ9vR2mZ7pL4wX8cN1bT5fH3jD6gS0aYkQ9vR2mZ");
        assert!(validate_session_secret(&secret, "TEST").is_ok());
    }
}
