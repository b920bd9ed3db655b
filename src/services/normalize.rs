// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping from Fitbit payloads to canonical points.
//!
//! Each mapping has a fixed timestamp policy: either the source value is a
//! naive wall-clock time in the configured timezone, or it is taken as an
//! absolute instant. Instants that do not fit a nanosecond line protocol
//! timestamp are rejected like unparseable ones. Fields are emitted only when
//! present in the source, with one exception: legacy sleep logs always report
//! `minutes_deep = 0`.

use crate::models::fitbit::{
    ActivityLogEntry, DailyValue, Device, HeartRateResponse, HeartRateZone, SleepLevelEntry,
    SleepLog, SleepResponse,
};
use crate::models::point::{FieldValue, Fields, Point, Tags};
use crate::time_utils::{localize, parse_absolute, parse_local};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

/// How a mapping interprets the timestamps in its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// Wall-clock time in the user's timezone.
    LocalNaive,
    /// Carries its own offset; offset-less values are taken as UTC.
    Absolute,
}

impl TimestampKind {
    pub fn resolve(self, raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
        let time = match self {
            TimestampKind::LocalNaive => parse_local(raw, tz),
            TimestampKind::Absolute => parse_absolute(raw),
        }?;
        // Line protocol carries i64 nanoseconds since the epoch
        time.timestamp_nanos_opt().map(|_| time)
    }
}

pub const DAILY_SERIES_TIME: TimestampKind = TimestampKind::LocalNaive;
pub const HEART_SUMMARY_TIME: TimestampKind = TimestampKind::Absolute;
pub const INTRADAY_HEART_TIME: TimestampKind = TimestampKind::LocalNaive;
pub const SLEEP_TIME: TimestampKind = TimestampKind::LocalNaive;
pub const ACTIVITY_TIME: TimestampKind = TimestampKind::Absolute;
pub const DEVICE_TIME: TimestampKind = TimestampKind::LocalNaive;

pub const RESTING_HEART_RATE: &str = "restingHeartRate";
pub const HEART_RATE_ZONES: &str = "heartRateZones";
pub const HEART_RATE: &str = "heartrate";
pub const SLEEP: &str = "sleep";
pub const SLEEP_LEVELS: &str = "sleep_levels";
pub const ACTIVITY: &str = "activity";
pub const DEVICE_BATTERY_LEVEL: &str = "deviceBatteryLevel";

/// Map a sleep stage label to its canonical name.
///
/// Legacy ("classic") logs use `asleep`/`restless`/`awake`.
pub fn canonical_stage(level: &str) -> &str {
    match level {
        "asleep" => "light",
        "restless" => "rem",
        "awake" => "wake",
        other => other,
    }
}

/// Stateless payload-to-point mapper bound to the user's timezone.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    tz: Tz,
}

impl Normalizer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn resolve(
        &self,
        kind: TimestampKind,
        raw: Option<&str>,
        what: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = raw?;
        let resolved = kind.resolve(raw, self.tz);
        if resolved.is_none() {
            tracing::warn!(measurement = what, raw, "Skipping record with bad timestamp");
        }
        resolved
    }

    /// `{"activities-steps": [{"dateTime": .., "value": ..}]}` → one point per day.
    pub fn daily_series(&self, measurement: &str, values: &[DailyValue]) -> Vec<Point> {
        values
            .iter()
            .filter_map(|day| {
                let time =
                    self.resolve(DAILY_SERIES_TIME, day.date_time.as_deref(), measurement)?;
                let value = day.value?;
                Some(Point::value(measurement, time, value))
            })
            .collect()
    }

    /// Resting heart rate and zones per day, plus the intraday samples of `date`.
    pub fn heart_rate(&self, response: &HeartRateResponse, date: NaiveDate) -> Vec<Point> {
        let mut points = Vec::new();

        for day in &response.days {
            let Some(summary) = &day.value else { continue };
            let Some(time) = self.resolve(
                HEART_SUMMARY_TIME,
                day.date_time.as_deref(),
                RESTING_HEART_RATE,
            ) else {
                continue;
            };

            if let Some(resting) = summary.resting_heart_rate {
                points.push(Point::value(RESTING_HEART_RATE, time, resting));
            }

            for zone in summary.heart_rate_zones.iter().flatten() {
                points.extend(heart_rate_zone(zone, time));
            }
        }

        if let Some(intraday) = &response.intraday {
            for sample in &intraday.dataset {
                let (Some(clock), Some(value)) = (sample.time.as_deref(), sample.value) else {
                    continue;
                };
                let raw = format!("{date}T{clock}");
                if let Some(time) =
                    self.resolve(INTRADAY_HEART_TIME, Some(raw.as_str()), HEART_RATE)
                {
                    points.push(Point::value(HEART_RATE, time, value));
                }
            }
        }

        points
    }

    /// Every session of `response`; see [`Normalizer::sleep_session`].
    pub fn sleep(&self, response: &SleepResponse, date: NaiveDate) -> Vec<Point> {
        response
            .sleep
            .iter()
            .flat_map(|log| self.sleep_session(log, date))
            .collect()
    }

    /// One summary point followed by one point per stage transition.
    ///
    /// The summary is stamped with `startTime`, else `dateOfSleep`, else local
    /// midnight of `date`.
    pub fn sleep_session(&self, log: &SleepLog, date: NaiveDate) -> Vec<Point> {
        let mut points = Vec::new();

        let time = match log.start_time.as_deref().or(log.date_of_sleep.as_deref()) {
            Some(raw) => self.resolve(SLEEP_TIME, Some(raw), SLEEP),
            None => {
                tracing::debug!(%date, "Sleep log without start time, using run date");
                self.local_midnight(date)
            }
        };
        if let Some(time) = time {
            points.extend(Point::new(SLEEP, time, Tags::new(), sleep_fields(log)));
        }

        if let Some(levels) = &log.levels {
            let entries = levels.data.iter().chain(levels.short_data.iter()).flatten();
            points.extend(entries.filter_map(|entry| self.sleep_level(entry)));
        }

        points
    }

    fn local_midnight(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let time = localize(date.and_time(NaiveTime::MIN), self.tz);
        time.timestamp_nanos_opt().map(|_| time)
    }

    fn sleep_level(&self, entry: &SleepLevelEntry) -> Option<Point> {
        let time = self.resolve(SLEEP_TIME, entry.date_time.as_deref(), SLEEP_LEVELS)?;
        let seconds = entry.seconds?;

        let mut tags = Tags::new();
        if let Some(level) = &entry.level {
            tags.insert("level".to_string(), canonical_stage(level).to_string());
        }
        let fields = Fields::from([("seconds".to_string(), integer(seconds))]);
        Point::new(SLEEP_LEVELS, time, tags, fields)
    }

    /// Battery level per device, tagged with its identity.
    pub fn devices(&self, devices: &[Device]) -> Vec<Point> {
        devices
            .iter()
            .filter_map(|device| {
                let time = self.resolve(
                    DEVICE_TIME,
                    device.last_sync_time.as_deref(),
                    DEVICE_BATTERY_LEVEL,
                )?;
                let Some(level) = device.battery_level else {
                    tracing::debug!(id = ?device.id, "Device without battery level");
                    return None;
                };

                let mut tags = Tags::new();
                put_tag(&mut tags, "id", &device.id);
                put_tag(&mut tags, "deviceVersion", &device.device_version);
                put_tag(&mut tags, "type", &device.device_type);
                put_tag(&mut tags, "mac", &device.mac);

                let fields = Fields::from([("value".to_string(), FieldValue::Float(level))]);
                Point::new(DEVICE_BATTERY_LEVEL, time, tags, fields)
            })
            .collect()
    }

    pub fn activities(&self, entries: &[ActivityLogEntry]) -> Vec<Point> {
        entries
            .iter()
            .filter_map(|entry| self.activity(entry))
            .collect()
    }

    fn activity(&self, entry: &ActivityLogEntry) -> Option<Point> {
        let time = self.resolve(ACTIVITY_TIME, entry.start_time.as_deref(), ACTIVITY)?;

        let mut fields = Fields::new();
        put_int(&mut fields, "activeDuration", entry.active_duration);
        put_int(&mut fields, "averageHeartRate", entry.average_heart_rate);
        put_int(&mut fields, "calories", entry.calories);
        put_int(&mut fields, "duration", entry.duration);
        put_float(&mut fields, "distance", entry.distance);
        put_float(&mut fields, "pace", entry.pace);
        put_float(&mut fields, "speed", entry.speed);
        put_int(&mut fields, "elevationGain", entry.elevation_gain);
        put_int(&mut fields, "steps", entry.steps);

        for level in entry.activity_level.iter().flatten() {
            let (Some(name), Some(minutes)) = (&level.name, level.minutes) else {
                continue;
            };
            let key = if name == "sedentary" {
                format!("{name}Minutes")
            } else {
                format!("{name}ActiveMinutes")
            };
            fields.insert(key, integer(minutes));
        }

        let mut tags = Tags::new();
        put_tag(&mut tags, "activityName", &entry.activity_name);
        if entry.distance.is_some() {
            put_tag(&mut tags, "distanceUnit", &entry.distance_unit);
        }

        let point = Point::new(ACTIVITY, time, tags, fields);
        if point.is_none() {
            tracing::debug!(name = ?entry.activity_name, "Activity without any fields");
        }
        point
    }
}

fn heart_rate_zone(zone: &HeartRateZone, time: DateTime<Utc>) -> Option<Point> {
    let mut fields = Fields::new();
    put_float(&mut fields, "caloriesOut", zone.calories_out);
    put_float(&mut fields, "min", zone.min);
    put_float(&mut fields, "max", zone.max);
    put_float(&mut fields, "minutes", zone.minutes);

    let mut tags = Tags::new();
    put_tag(&mut tags, "zone", &zone.name);
    Point::new(HEART_RATE_ZONES, time, tags, fields)
}

fn sleep_fields(log: &SleepLog) -> Fields {
    let mut fields = Fields::new();
    put_int(&mut fields, "duration", log.duration);
    put_int(&mut fields, "efficiency", log.efficiency);
    if let Some(main) = log.is_main_sleep {
        fields.insert("is_main_sleep".to_string(), FieldValue::Boolean(main));
    }
    put_int(&mut fields, "minutes_asleep", log.minutes_asleep);
    put_int(&mut fields, "minutes_awake", log.minutes_awake);
    put_int(&mut fields, "time_in_bed", log.time_in_bed);

    if log.is_stages() {
        put_int(&mut fields, "minutes_deep", log.summary_minutes("deep"));
        put_int(&mut fields, "minutes_light", log.summary_minutes("light"));
        put_int(&mut fields, "minutes_rem", log.summary_minutes("rem"));
        put_int(&mut fields, "minutes_wake", log.summary_minutes("wake"));
    } else {
        // Classic logs have no deep stage at all
        fields.insert("minutes_deep".to_string(), FieldValue::Integer(0));
        put_int(&mut fields, "minutes_light", log.summary_minutes("asleep"));
        put_int(&mut fields, "minutes_rem", log.summary_minutes("restless"));
        put_int(&mut fields, "minutes_wake", log.summary_minutes("awake"));
    }
    fields
}

fn integer(value: f64) -> FieldValue {
    FieldValue::Integer(value.trunc() as i64)
}

fn put_int(fields: &mut Fields, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), integer(value));
    }
}

fn put_float(fields: &mut Fields, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        fields.insert(key.to_string(), FieldValue::Float(value));
    }
}

fn put_tag(tags: &mut Tags, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        tags.insert(key.to_string(), value.clone());
    }
}
