//! Server configuration.
//!
//! # Responsibility
//! - Read process settings from the environment, with defaults for local runs.
//! - Fail startup on malformed values instead of guessing.
//!
//! # Invariants
//! - `log_dir`, when present, is passed through untouched; core logging validates it.
//! - `cors_origin` is always a valid header value.

use auratasks_core::default_log_level;
use axum::http::HeaderValue;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Signing secret used when `JWT_SECRET` is unset. Local development only.
pub const DEV_JWT_SECRET: &str = "auratasks-dev-secret";

const DEFAULT_PORT: &str = "5000";
const DEFAULT_DB_PATH: &str = "auratasks.sqlite3";
const DEFAULT_TOKEN_TTL_SECS: &str = "3600";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_QUOTE_URL: &str = "https://zenquotes.io/api/random";
const DEFAULT_QUOTE_TIMEOUT_MS: &str = "5000";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cors_origin: HeaderValue,
    pub quote_url: String,
    pub quote_timeout: Duration,
    pub log_level: String,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a key to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token_ttl_secs: u64 = parse("TOKEN_TTL_SECS", var("TOKEN_TTL_SECS"), DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs == 0 {
            return Err(invalid("TOKEN_TTL_SECS", "0", "must be positive"));
        }
        let quote_timeout_ms: u64 =
            parse("QUOTE_TIMEOUT_MS", var("QUOTE_TIMEOUT_MS"), DEFAULT_QUOTE_TIMEOUT_MS)?;

        let cors_origin = var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = HeaderValue::from_str(cors_origin.trim())
            .map_err(|err| invalid("CORS_ORIGIN", &cors_origin, &err.to_string()))?;

        Ok(Self {
            port: parse("PORT", var("PORT"), DEFAULT_PORT)?,
            db_path: PathBuf::from(var("AURATASKS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            jwt_secret: var("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            token_ttl: Duration::from_secs(token_ttl_secs),
            cors_origin,
            quote_url: var("QUOTE_URL").unwrap_or_else(|| DEFAULT_QUOTE_URL.to_string()),
            quote_timeout: Duration::from_millis(quote_timeout_ms),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir: var("LOG_DIR"),
        })
    }

    /// Whether tokens are signed with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse<T: FromStr>(key: &'static str, raw: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = raw.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|err: T::Err| invalid(key, &raw, &err.to_string()))
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
