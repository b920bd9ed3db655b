// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fitbit Web API response payloads.
//!
//! Only the outer shape of each response is strict. Every leaf is optional
//! and deserialized leniently: Fitbit sends many numbers as strings, and a
//! malformed sub-structure decodes as `None` instead of failing the whole
//! response.

use serde::Deserialize;
use std::collections::HashMap;

/// Lenient leaf deserializers.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Any structure; decodes as `None` when the shape does not match.
    pub fn any<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// A finite number, given either as a JSON number or a numeric string.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let number = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|n| n.is_finite()))
    }

    /// A boolean, also accepting `"true"`/`"false"` and 0/1.
    pub fn boolean<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) => n.as_f64().map(|n| n != 0.0),
            Some(Value::String(s)) => s.trim().parse::<bool>().ok(),
            _ => None,
        })
    }

    /// A non-empty string; numbers are rendered as text.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        let text = match value {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Ok(text.filter(|s| !s.trim().is_empty()))
    }
}

// ─── Daily time series ───────────────────────────────────────────────────────

/// One entry of a `.../date/{date}/1d.json` time series.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyValue {
    #[serde(rename = "dateTime", default, deserialize_with = "lenient::string")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
}

// ─── Heart rate ──────────────────────────────────────────────────────────────

/// Response of the heart rate time series with intraday detail.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateResponse {
    #[serde(rename = "activities-heart")]
    pub days: Vec<HeartRateDay>,
    #[serde(
        rename = "activities-heart-intraday",
        default,
        deserialize_with = "lenient::any"
    )]
    pub intraday: Option<IntradayHeartRate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateDay {
    #[serde(rename = "dateTime", default, deserialize_with = "lenient::string")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub value: Option<HeartRateSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateSummary {
    #[serde(
        rename = "restingHeartRate",
        default,
        deserialize_with = "lenient::number"
    )]
    pub resting_heart_rate: Option<f64>,
    #[serde(rename = "heartRateZones", default, deserialize_with = "lenient::any")]
    pub heart_rate_zones: Option<Vec<HeartRateZone>>,
}

/// A heart rate zone. Fitbit omits `caloriesOut` on some accounts.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartRateZone {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(rename = "caloriesOut", default, deserialize_with = "lenient::number")]
    pub calories_out: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub minutes: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntradayHeartRate {
    #[serde(default)]
    pub dataset: Vec<IntradayValue>,
}

/// One intraday sample; `time` is a wall-clock `HH:MM:SS` on the request date.
#[derive(Debug, Clone, Deserialize)]
pub struct IntradayValue {
    #[serde(default, deserialize_with = "lenient::string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
}

// ─── Sleep ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SleepResponse {
    pub sleep: Vec<SleepLog>,
}

/// A sleep session, either `"stages"` or legacy `"classic"`.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepLog {
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub log_type: Option<String>,
    #[serde(rename = "startTime", default, deserialize_with = "lenient::string")]
    pub start_time: Option<String>,
    #[serde(rename = "dateOfSleep", default, deserialize_with = "lenient::string")]
    pub date_of_sleep: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub efficiency: Option<f64>,
    #[serde(rename = "isMainSleep", default, deserialize_with = "lenient::boolean")]
    pub is_main_sleep: Option<bool>,
    #[serde(rename = "minutesAsleep", default, deserialize_with = "lenient::number")]
    pub minutes_asleep: Option<f64>,
    #[serde(rename = "minutesAwake", default, deserialize_with = "lenient::number")]
    pub minutes_awake: Option<f64>,
    #[serde(rename = "timeInBed", default, deserialize_with = "lenient::number")]
    pub time_in_bed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub levels: Option<SleepLevels>,
}

impl SleepLog {
    pub fn is_stages(&self) -> bool {
        self.log_type.as_deref() == Some("stages")
    }

    /// Minutes recorded for `stage` in `levels.summary`.
    pub fn summary_minutes(&self, stage: &str) -> Option<f64> {
        self.levels
            .as_ref()?
            .summary
            .as_ref()?
            .get(stage)?
            .minutes
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepLevels {
    #[serde(default, deserialize_with = "lenient::any")]
    pub summary: Option<HashMap<String, StageSummary>>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub data: Option<Vec<SleepLevelEntry>>,
    #[serde(rename = "shortData", default, deserialize_with = "lenient::any")]
    pub short_data: Option<Vec<SleepLevelEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StageSummary {
    #[serde(default, deserialize_with = "lenient::number")]
    pub minutes: Option<f64>,
}

/// A stage transition inside a sleep session.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepLevelEntry {
    #[serde(rename = "dateTime", default, deserialize_with = "lenient::string")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub seconds: Option<f64>,
}

// ─── Devices ─────────────────────────────────────────────────────────────────

/// A paired tracker or scale from `devices.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(rename = "deviceVersion", default, deserialize_with = "lenient::string")]
    pub device_version: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mac: Option<String>,
    #[serde(rename = "lastSyncTime", default, deserialize_with = "lenient::string")]
    pub last_sync_time: Option<String>,
    #[serde(rename = "batteryLevel", default, deserialize_with = "lenient::number")]
    pub battery_level: Option<f64>,
}

// ─── Activity log ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityLogEntry>,
}

/// A logged or auto-recognized exercise from `activities/list.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub activity_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub active_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub average_heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub distance_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pace: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub elevation_gain: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub steps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::any")]
    pub activity_level: Option<Vec<ActivityLevel>>,
}

/// Minutes spent at one intensity during an activity.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityLevel {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub minutes: Option<f64>,
}
