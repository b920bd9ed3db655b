// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable storage for the rotating Fitbit refresh token.

use crate::error::AppError;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

/// Refresh token persisted in a plaintext file, with an environment fallback.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    fallback: Option<String>,
}

impl CredentialStore {
    /// `fallback` is only consulted when the file does not exist. An existing
    /// file that is empty or whitespace means "no token", not "ask the fallback".
    pub fn new(path: impl Into<PathBuf>, fallback: Option<String>) -> Self {
        Self {
            path: path.into(),
            fallback,
        }
    }

    /// Load the current refresh token.
    ///
    /// `Ok(None)` means no token anywhere: the first run has to exchange an
    /// authorization code.
    pub fn load(&self) -> Result<Option<String>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                tracing::debug!(path = %self.path.display(), "Loaded refresh token from file");
                Ok(non_empty(&contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Ok(self.fallback.as_deref().and_then(non_empty))
            }
            Err(e) => Err(AppError::Credentials(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    /// Replace the stored refresh token.
    ///
    /// Writes a sibling temp file, fsyncs it and renames it over the target, so
    /// a crash leaves either the old or the new token in place.
    pub fn save(&self, token: &str) -> Result<(), AppError> {
        let tmp_path = self.path.with_extension("tmp");
        let err = |what: &str, e: std::io::Error| {
            AppError::Credentials(format!("{} {}: {}", what, tmp_path.display(), e))
        };

        {
            let mut file = File::create(&tmp_path).map_err(|e| err("Failed to create", e))?;
            file.write_all(token.trim().as_bytes())
                .map_err(|e| err("Failed to write", e))?;
            file.sync_all().map_err(|e| err("Failed to sync", e))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            AppError::Credentials(format!(
                "Failed to rename {} to {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::info!(path = %self.path.display(), "Refresh token saved");
        Ok(())
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let token = raw.trim();
    (!token.is_empty()).then(|| token.to_string())
}
