// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Refresh token rotation against a mock token endpoint.

use fitbit_ingest::config::{Config, ConfigError};
use fitbit_ingest::error::AppError;
use fitbit_ingest::services::{CredentialStore, TokenManager};
use mockito::{Matcher, Server};
use std::fs;
use tempfile::TempDir;

mod common;
use common::test_config;

fn store_for(config: &Config) -> CredentialStore {
    CredentialStore::new(
        config.refresh_token_file.clone(),
        config.fitbit_refresh_token.clone(),
    )
}

fn token_body(access: &str, refresh: &str) -> String {
    format!(
        r#"{{"access_token":"{access}","refresh_token":"{refresh}","expires_in":28800,"token_type":"Bearer","user_id":"ABC123"}}"#
    )
}

#[tokio::test]
async fn test_refresh_persists_rotated_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "rt-old".into()),
        ]))
        .with_status(200)
        .with_body(token_body("at-new", "rt-new"))
        .expect(1)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.url(), dir.path());
    fs::write(&config.refresh_token_file, "rt-old\n").unwrap();

    let access = TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap();

    assert_eq!(access, "at-new");
    let stored = fs::read_to_string(&config.refresh_token_file).unwrap();
    assert_eq!(stored, "rt-new");
    assert!(!dir.path().join(".fitbit-refreshtoken.tmp").exists());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_environment_token_used_when_file_missing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::UrlEncoded(
            "refresh_token".into(),
            "rt-from-env".into(),
        ))
        .with_status(200)
        .with_body(token_body("at-1", "rt-2"))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = Config {
        fitbit_refresh_token: Some("rt-from-env".to_string()),
        ..test_config(&server.url(), dir.path())
    };

    TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap();

    // The file now wins over the environment on the next run
    assert_eq!(store_for(&config).load().unwrap().as_deref(), Some("rt-2"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stored_token_preferred_over_initial_code() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "refresh_token".into(),
        ))
        .with_status(200)
        .with_body(token_body("at-1", "rt-2"))
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = Config {
        fitbit_initial_code: Some("stale-code".to_string()),
        ..test_config(&server.url(), dir.path())
    };
    fs::write(&config.refresh_token_file, "rt-1").unwrap();

    TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_refresh_keeps_stored_token() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/oauth2/token")
        .with_status(401)
        .with_body(r#"{"errors":[{"errorType":"invalid_grant"}],"success":false}"#)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server.url(), dir.path());
    fs::write(&config.refresh_token_file, "rt-old").unwrap();

    let err = TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Auth(_)));
    assert!(err.to_string().contains("invalid_grant"));
    assert_eq!(
        fs::read_to_string(&config.refresh_token_file).unwrap(),
        "rt-old"
    );
}

#[tokio::test]
async fn test_pre_provisioned_access_token_skips_exchange() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .expect(0)
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let config = Config {
        fitbit_access_token: Some("at-static".to_string()),
        ..test_config(&server.url(), dir.path())
    };
    fs::write(&config.refresh_token_file, "rt-untouched").unwrap();

    let access = TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap();

    assert_eq!(access, "at-static");
    assert_eq!(
        fs::read_to_string(&config.refresh_token_file).unwrap(),
        "rt-untouched"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_credentials_asks_for_authorization() {
    let dir = TempDir::new().unwrap();
    let config = test_config("http://127.0.0.1:9", dir.path());

    let err = TokenManager::new(&config, store_for(&config))
        .authorize()
        .await
        .unwrap_err();

    match err {
        AppError::Config(ConfigError::AuthorizationRequired(url)) => {
            assert!(url.contains("client_id=test_client_id"));
            assert!(url.contains("scope="));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!config.refresh_token_file.exists());
}
