// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitbit OAuth token lifecycle.
//!
//! Handles:
//! - Pre-provisioned access tokens (no exchange)
//! - Refresh token exchange, persisting the rotated refresh token
//! - First-run authorization code exchange

use crate::config::{Config, ConfigError};
use crate::error::AppError;
use crate::services::credentials::CredentialStore;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://www.fitbit.com/oauth2/authorize";

/// Scopes needed by the fetchers.
const SCOPES: &[&str] = &[
    "activity",
    "heartrate",
    "nutrition",
    "settings",
    "sleep",
    "weight",
];

/// Token response from Fitbit.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Grant used for the token exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant<'a> {
    RefreshToken(&'a str),
    AuthorizationCode(&'a str),
}

/// Obtains the access token used by every fetch of a run.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    access_token: Option<String>,
    initial_code: Option<String>,
    store: CredentialStore,
}

impl TokenManager {
    pub fn new(config: &Config, store: CredentialStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: config.token_url(),
            client_id: config.fitbit_client_id.clone(),
            client_secret: config.fitbit_client_secret.clone(),
            redirect_uri: config.fitbit_redirect_uri.clone(),
            access_token: config.fitbit_access_token.clone(),
            initial_code: config.fitbit_initial_code.clone(),
            store,
        }
    }

    /// Return an access token, exchanging credentials if necessary.
    ///
    /// The refresh token returned by Fitbit is single-use, so it is persisted
    /// before the access token is handed out.
    pub async fn authorize(&self) -> Result<String, AppError> {
        if let Some(token) = &self.access_token {
            tracing::info!("Using pre-provisioned access token");
            return Ok(token.clone());
        }

        let stored = self.store.load()?;
        let grant = match (stored.as_deref(), self.initial_code.as_deref()) {
            (Some(refresh_token), _) => Grant::RefreshToken(refresh_token),
            (None, Some(code)) => Grant::AuthorizationCode(code),
            (None, None) => {
                return Err(ConfigError::AuthorizationRequired(self.authorization_url()).into());
            }
        };

        let response = self.exchange(grant).await?;
        self.store.save(&response.refresh_token)?;

        tracing::info!(
            user_id = response.user_id.as_deref().unwrap_or("-"),
            expires_in = response.expires_in,
            "Fitbit access token obtained"
        );
        Ok(response.access_token)
    }

    async fn exchange(&self, grant: Grant<'_>) -> Result<TokenResponse, AppError> {
        let (grant_type, key, value) = match grant {
            Grant::RefreshToken(token) => ("refresh_token", "refresh_token", token),
            Grant::AuthorizationCode(code) => ("authorization_code", "code", code),
        };
        tracing::info!(grant_type, "Exchanging Fitbit token");

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", grant_type),
                ("redirect_uri", self.redirect_uri.as_str()),
                (key, value),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), grant_type, "Token exchange rejected");
            return Err(AppError::Auth(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("JSON parse error: {}", e)))
    }

    /// URL the operator visits once to obtain an authorization code.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&SCOPES.join(" ")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    fn manager(server_url: &str, dir: &TempDir, config: Config) -> TokenManager {
        let config = Config {
            fitbit_api_url: server_url.to_string(),
            ..config
        };
        let store = CredentialStore::new(dir.path().join("token"), None);
        TokenManager::new(&config, store)
    }

    #[test]
    fn test_authorization_url_is_encoded() {
        let dir = TempDir::new().unwrap();
        let manager = manager("http://unused", &dir, Config::test_default());
        let url = manager.authorization_url();
        assert!(url.starts_with("https://www.fitbit.com/oauth2/authorize?response_type=code"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost"));
        assert!(url.contains("scope=activity%20heartrate"));
    }

    #[tokio::test]
    async fn test_authorization_code_grant_on_first_run() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/token")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "one-time-code".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "http://localhost".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"at-1","refresh_token":"rt-1","expires_in":28800}"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let config = Config {
            fitbit_initial_code: Some("one-time-code".to_string()),
            ..Config::test_default()
        };
        let manager = manager(&server.url(), &dir, config);

        assert_eq!(manager.authorize().await.unwrap(), "at-1");
        assert_eq!(manager.store.load().unwrap().as_deref(), Some("rt-1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_code_and_token_is_config_error() {
        let dir = TempDir::new().unwrap();
        let manager = manager("http://127.0.0.1:9", &dir, Config::test_default());
        let err = manager.authorize().await.unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("oauth2/authorize"));
    }
}
