// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One scheduled ingestion run.
//!
//! Workflow:
//! 1. Connect to InfluxDB (create and select the database)
//! 2. Authorize against Fitbit
//! 3. Fetch every resource family in a fixed order, normalizing into the buffer
//! 4. Flush the buffer in chunks

use crate::config::Config;
use crate::db::{BatchWriter, InfluxSink, PointSink};
use crate::error::AppError;
use crate::models::point::PointBuffer;
use crate::services::fitbit::DAILY_SERIES;
use crate::services::{CredentialStore, FitbitClient, Normalizer, TokenManager};
use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Tz;

/// Dates queried by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub today: NaiveDate,
    pub lookback_days: u32,
}

impl RunWindow {
    pub fn new(today: NaiveDate, lookback_days: u32) -> Self {
        Self {
            today,
            lookback_days,
        }
    }

    /// Window ending on the current date in `tz`.
    pub fn current(tz: Tz, lookback_days: u32) -> Self {
        Self::new(Utc::now().with_timezone(&tz).date_naive(), lookback_days)
    }

    /// First day of the sleep range.
    pub fn start(&self) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(self.today)
    }

    /// Exclusive upper bound for the activity log.
    pub fn activities_before(&self) -> NaiveDate {
        self.today.succ_opt().unwrap_or(self.today)
    }
}

/// Run against the InfluxDB instance named in `config`.
pub async fn run(config: &Config) -> Result<usize, AppError> {
    let mut sink = InfluxSink::from_config(config);
    let window = RunWindow::current(config.timezone, config.lookback_days);
    run_with_sink(config, &mut sink, window).await
}

/// Full run against an arbitrary sink. Returns the number of points written.
pub async fn run_with_sink<S: PointSink>(
    config: &Config,
    sink: &mut S,
    window: RunWindow,
) -> Result<usize, AppError> {
    sink.create_database(&config.fitbit_database).await?;
    sink.switch_database(&config.fitbit_database).await?;

    let store = CredentialStore::new(
        config.refresh_token_file.clone(),
        config.fitbit_refresh_token.clone(),
    );
    let access_token = TokenManager::new(config, store).authorize().await?;

    let client = FitbitClient::new(
        config.fitbit_api_url.clone(),
        access_token,
        config.fitbit_language.clone(),
    );
    let normalizer = Normalizer::new(config.timezone);

    let buffer = collect(&client, &normalizer, window, config.activity_limit).await?;
    tracing::info!(count = buffer.len(), "Collected points");

    BatchWriter::new(config.influxdb_chunk_size)
        .flush(sink, buffer.as_slice())
        .await
}

/// Fetch every resource family in order and normalize into a fresh buffer.
pub async fn collect(
    client: &FitbitClient,
    normalizer: &Normalizer,
    window: RunWindow,
    activity_limit: u32,
) -> Result<PointBuffer, AppError> {
    let mut buffer = PointBuffer::new();

    let devices = client.get_devices().await?;
    buffer.extend(normalizer.devices(&devices));

    let sleep = client.get_sleep(window.start(), window.today).await?;
    buffer.extend(normalizer.sleep(&sleep, window.today));

    for resource in DAILY_SERIES {
        let values = client.get_daily_series(*resource, window.today).await?;
        buffer.extend(normalizer.daily_series(resource.name, &values));
    }

    let heart = client.get_heart_rate(window.today).await?;
    buffer.extend(normalizer.heart_rate(&heart, window.today));

    let activities = client
        .get_activities(window.activities_before(), activity_limit, 0)
        .await?;
    buffer.extend(normalizer.activities(&activities));

    Ok(buffer)
}
