// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The configuration is read once at process start and passed to every
//! component that needs it. A `.env` file is honored for local runs.

use chrono_tz::Tz;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use validator::Validate;

/// Name of the refresh token file, kept next to the executable by default.
pub const REFRESH_TOKEN_FILE_NAME: &str = ".fitbit-refreshtoken";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone, Validate)]
pub struct Config {
    // --- Fitbit OAuth ---
    /// Fitbit OAuth client ID
    pub fitbit_client_id: String,
    /// Fitbit OAuth client secret
    pub fitbit_client_secret: String,
    /// Pre-provisioned access token; skips the token exchange when set
    pub fitbit_access_token: Option<String>,
    /// One-time authorization code for the first run
    pub fitbit_initial_code: Option<String>,
    /// Refresh token fallback used when the token file does not exist
    pub fitbit_refresh_token: Option<String>,
    /// Where the rotating refresh token is persisted
    pub refresh_token_file: PathBuf,
    /// Redirect URI registered with the Fitbit application
    pub fitbit_redirect_uri: String,

    // --- Fitbit API ---
    /// API base URL (overridable for tests)
    pub fitbit_api_url: String,
    /// Value of the Accept-Language header
    pub fitbit_language: String,
    /// Number of entries requested from the activity log
    #[validate(range(min = 1, max = 100))]
    pub activity_limit: u32,
    /// Days of sleep history fetched before today
    #[validate(range(min = 1, max = 30))]
    pub lookback_days: u32,
    /// Timezone of the naive local timestamps Fitbit returns
    pub timezone: Tz,

    // --- InfluxDB ---
    pub influxdb_host: String,
    pub influxdb_port: u16,
    pub influxdb_username: Option<String>,
    pub influxdb_password: Option<String>,
    /// Target database
    pub fitbit_database: String,
    /// Points per write request
    #[validate(range(min = 1, max = 5000))]
    pub influxdb_chunk_size: usize,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            fitbit_client_id: "test_client_id".to_string(),
            fitbit_client_secret: "test_secret".to_string(),
            fitbit_access_token: None,
            fitbit_initial_code: None,
            fitbit_refresh_token: None,
            refresh_token_file: PathBuf::from(REFRESH_TOKEN_FILE_NAME),
            fitbit_redirect_uri: "http://localhost".to_string(),
            fitbit_api_url: "https://api.fitbit.com".to_string(),
            fitbit_language: "en_US".to_string(),
            activity_limit: 10,
            lookback_days: 1,
            timezone: chrono_tz::Europe::Amsterdam,
            influxdb_host: "localhost".to_string(),
            influxdb_port: 8086,
            influxdb_username: None,
            influxdb_password: None,
            fitbit_database: "fitbit".to_string(),
            influxdb_chunk_size: 50,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.into());

        let config = Self {
            fitbit_client_id: get("FITBIT_CLIENT_ID")
                .ok_or(ConfigError::Missing("FITBIT_CLIENT_ID"))?,
            fitbit_client_secret: get("FITBIT_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("FITBIT_CLIENT_SECRET"))?,
            fitbit_access_token: get("FITBIT_ACCESS_TOKEN"),
            fitbit_initial_code: get("FITBIT_INITIAL_CODE"),
            fitbit_refresh_token: get("FITBIT_REFRESH_TOKEN"),
            refresh_token_file: get("FITBIT_REFRESH_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_refresh_token_file),
            fitbit_redirect_uri: or_default("FITBIT_REDIRECT_URI", "http://localhost"),
            fitbit_api_url: or_default("FITBIT_API_URL", "https://api.fitbit.com")
                .trim_end_matches('/')
                .to_string(),
            fitbit_language: or_default("FITBIT_LANGUAGE", "en_US"),
            activity_limit: parse_var(&get, "FITBIT_ACTIVITY_LIMIT", 10)?,
            lookback_days: parse_var(&get, "FITBIT_LOOKBACK_DAYS", 1)?,
            timezone: parse_var(&get, "LOCAL_TIMEZONE", chrono_tz::Europe::Amsterdam)?,
            influxdb_host: or_default("INFLUXDB_HOST", "localhost"),
            influxdb_port: parse_var(&get, "INFLUXDB_PORT", 8086)?,
            influxdb_username: get("INFLUXDB_USERNAME"),
            influxdb_password: get("INFLUXDB_PASSWORD"),
            fitbit_database: or_default("FITBIT_DATABASE", "fitbit"),
            influxdb_chunk_size: parse_var(&get, "INFLUXDB_CHUNK_SIZE", 50)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Base URL of the InfluxDB HTTP API.
    pub fn influxdb_url(&self) -> String {
        format!("http://{}:{}", self.influxdb_host, self.influxdb_port)
    }

    /// Fitbit token endpoint.
    pub fn token_url(&self) -> String {
        format!("{}/oauth2/token", self.fitbit_api_url)
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

/// `.fitbit-refreshtoken` in the directory of the running executable.
fn default_refresh_token_file() -> PathBuf {
    env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(REFRESH_TOKEN_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(REFRESH_TOKEN_FILE_NAME))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Out of range: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("No refresh token found; authorize at {0} and set FITBIT_INITIAL_CODE")]
    AuthorizationRequired(String),
}
