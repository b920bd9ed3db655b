// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitbit Web API client.
//!
//! One authenticated GET per resource family. Any non-success status is
//! returned as an error and aborts the run; there is no retry.

use crate::error::AppError;
use crate::models::fitbit::{
    ActivityListResponse, ActivityLogEntry, DailyValue, Device, HeartRateResponse, SleepResponse,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A daily time series resource, e.g. `activities/steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyResource {
    pub category: &'static str,
    pub name: &'static str,
}

impl DailyResource {
    pub const fn new(category: &'static str, name: &'static str) -> Self {
        Self { category, name }
    }

    /// Key of the series array in the response, e.g. `foods-log-water`.
    pub fn payload_key(&self) -> String {
        format!("{}-{}", self.category.replace('/', "-"), self.name)
    }
}

/// Daily series pulled on every run, in fetch order.
pub const DAILY_SERIES: &[DailyResource] = &[
    DailyResource::new("activities", "steps"),
    DailyResource::new("activities", "distance"),
    DailyResource::new("activities", "floors"),
    DailyResource::new("activities", "elevation"),
    DailyResource::new("activities", "minutesSedentary"),
    DailyResource::new("activities", "minutesLightlyActive"),
    DailyResource::new("activities", "minutesFairlyActive"),
    DailyResource::new("activities", "minutesVeryActive"),
    DailyResource::new("activities", "calories"),
    DailyResource::new("activities", "activityCalories"),
    DailyResource::new("body", "weight"),
    DailyResource::new("body", "fat"),
    DailyResource::new("body", "bmi"),
    DailyResource::new("foods/log", "water"),
    DailyResource::new("foods/log", "caloriesIn"),
];

/// Fitbit API client bound to one access token.
#[derive(Clone)]
pub struct FitbitClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    language: String,
}

impl FitbitClient {
    pub fn new(base_url: impl Into<String>, access_token: String, language: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token,
            language,
        }
    }

    /// Paired devices with battery state.
    pub async fn get_devices(&self) -> Result<Vec<Device>, AppError> {
        self.get_json("/1/user/-/devices.json", &[]).await
    }

    /// Sleep logs between `start` and `end`, inclusive.
    pub async fn get_sleep(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SleepResponse, AppError> {
        let path = format!("/1.2/user/-/sleep/date/{start}/{end}.json");
        self.get_json(&path, &[]).await
    }

    /// One day of a daily time series.
    pub async fn get_daily_series(
        &self,
        resource: DailyResource,
        date: NaiveDate,
    ) -> Result<Vec<DailyValue>, AppError> {
        let path = format!(
            "/1/user/-/{}/{}/date/{}/1d.json",
            resource.category, resource.name, date
        );
        let mut payload: Map<String, Value> = self.get_json(&path, &[]).await?;

        let key = resource.payload_key();
        let series = payload.remove(&key).ok_or_else(|| AppError::Transport {
            endpoint: path.clone(),
            message: format!("response has no `{}` array", key),
        })?;
        serde_json::from_value(series).map_err(|e| AppError::Transport {
            endpoint: path,
            message: format!("JSON parse error: {}", e),
        })
    }

    /// Heart rate summary and 1-minute intraday samples for `date`.
    pub async fn get_heart_rate(&self, date: NaiveDate) -> Result<HeartRateResponse, AppError> {
        let path = format!("/1/user/-/activities/heart/date/{date}/1d/1min.json");
        self.get_json(&path, &[]).await
    }

    /// Most recent activity log entries before `before`.
    pub async fn get_activities(
        &self,
        before: NaiveDate,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActivityLogEntry>, AppError> {
        let response: ActivityListResponse = self
            .get_json(
                "/1/user/-/activities/list.json",
                &[
                    ("beforeDate", before.to_string()),
                    ("sort", "desc".to_string()),
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                ],
            )
            .await?;
        Ok(response.activities)
    }

    /// Generic authenticated GET with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.language)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Transport {
                endpoint: path.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(endpoint = path, status = status.as_u16(), "Fitbit request failed");
            return Err(AppError::Fetch {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.json().await.map_err(|e| AppError::Transport {
            endpoint: path.to_string(),
            message: format!("JSON parse error: {}", e),
        })?;
        tracing::info!(endpoint = path, "Got response from Fitbit");
        Ok(payload)
    }
}
