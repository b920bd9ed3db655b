// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Every variant is fatal for a run. Components return these values and the
//! binary decides how to terminate.

use crate::config::ConfigError;

/// Application error type propagated up to the run driver.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Fitbit API error on {endpoint}: HTTP {status}: {body}")]
    Fetch {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Fitbit API request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("InfluxDB error: {0}")]
    Sink(String),
}

impl AppError {
    /// Whether the error happened before any network activity.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AppError::Config(_))
    }

    /// HTTP status of a failed source call, if there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Fetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, AppError>;
