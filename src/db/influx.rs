// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! InfluxDB 1.x HTTP client.

use crate::config::Config;
use crate::db::line_protocol::encode_batch;
use crate::db::PointSink;
use crate::error::AppError;
use crate::models::point::Point;

/// InfluxDB connection, opened once per run.
pub struct InfluxSink {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
}

impl InfluxSink {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            username: None,
            password: None,
            database: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut sink = Self::new(config.influxdb_url());
        sink.username = config.influxdb_username.clone();
        sink.password = config.influxdb_password.clone();
        sink
    }

    /// Database currently targeted by writes.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn auth_params(&self) -> Vec<(&'static str, String)> {
        match &self.username {
            Some(user) => vec![
                ("u", user.clone()),
                ("p", self.password.clone().unwrap_or_default()),
            ],
            None => Vec::new(),
        }
    }

    async fn check(response: reqwest::Response, what: &str) -> Result<(), AppError> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Sink(format!("{} failed: HTTP {}: {}", what, status, body)))
    }
}

impl PointSink for InfluxSink {
    async fn create_database(&mut self, name: &str) -> Result<(), AppError> {
        tracing::info!(url = %self.base_url, database = name, "Connecting to InfluxDB");

        let mut params = self.auth_params();
        params.push(("q", format!("CREATE DATABASE \"{}\"", name.replace('"', "\\\""))));

        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Sink(format!("InfluxDB connection failed: {}", e)))?;

        Self::check(response, "CREATE DATABASE").await
    }

    async fn switch_database(&mut self, name: &str) -> Result<(), AppError> {
        self.database = Some(name.to_string());
        Ok(())
    }

    async fn write_points(&mut self, points: &[Point]) -> Result<(), AppError> {
        let database = self
            .database
            .clone()
            .ok_or_else(|| AppError::Sink("No database selected".to_string()))?;

        let body = encode_batch(points)?;

        let mut params = self.auth_params();
        params.push(("db", database));
        params.push(("precision", "ns".to_string()));

        let response = self
            .http
            .post(format!("{}/write", self.base_url))
            .query(&params)
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Sink(format!("Unable to write points: {}", e)))?;

        Self::check(response, "Write").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_create_database_with_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "CREATE DATABASE \"fitbit\"".into()),
                Matcher::UrlEncoded("u".into(), "admin".into()),
                Matcher::UrlEncoded("p".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results":[{"statement_id":0}]}"#)
            .create_async()
            .await;

        let config = Config {
            influxdb_username: Some("admin".to_string()),
            influxdb_password: Some("secret".to_string()),
            ..Config::test_default()
        };
        let mut sink = InfluxSink::from_config(&config);
        sink.base_url = server.url();

        sink.create_database("fitbit").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_requires_database() {
        let mut sink = InfluxSink::new("http://127.0.0.1:9");
        let err = sink.write_points(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::Sink(_)));
    }

    #[tokio::test]
    async fn test_write_points_posts_line_protocol() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/write")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("db".into(), "fitbit".into()),
                Matcher::UrlEncoded("precision".into(), "ns".into()),
            ]))
            .match_body("steps value=5 0\nsteps value=6 0")
            .with_status(204)
            .create_async()
            .await;

        let mut sink = InfluxSink::new(server.url());
        sink.switch_database("fitbit").await.unwrap();
        assert_eq!(sink.database(), Some("fitbit"));

        let ts = Utc.timestamp_opt(0, 0).unwrap();
        let points = vec![Point::value("steps", ts, 5.0), Point::value("steps", ts, 6.0)];
        sink.write_points(&points).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_write_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/write")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"partial write: field type conflict"}"#)
            .create_async()
            .await;

        let mut sink = InfluxSink::new(server.url());
        sink.switch_database("fitbit").await.unwrap();
        let ts = Utc.timestamp_opt(0, 0).unwrap();
        let err = sink
            .write_points(&[Point::value("steps", ts, 1.0)])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("field type conflict"));
    }
}
