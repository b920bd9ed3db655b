// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.
//!
//! Fitbit mixes two timestamp styles: naive wall-clock values in the user's
//! profile timezone (`2024-03-09T23:41:30.000`, `2024-03-09`) and values that
//! carry their own offset (`2024-03-09T07:15:00.000-08:00`). Both end up as
//! `DateTime<Utc>`.

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a naive date-time, with or without fractional seconds, or a bare date.
pub fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Attach `tz` to a naive wall-clock value and convert to UTC.
///
/// Ambiguous values (DST fall-back) resolve to the earlier instant. Values in
/// a spring-forward gap are shifted forward by one hour.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
        }
    }
}

/// Parse a naive local timestamp and convert it to UTC.
pub fn parse_local(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    parse_naive(value).map(|naive| localize(naive, tz))
}

/// Parse a self-describing timestamp (offset or `Z` suffix) and convert to UTC.
///
/// Values without any offset are taken as UTC.
pub fn parse_absolute(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive(value).map(|naive| Utc.from_utc_datetime(&naive)))
}
