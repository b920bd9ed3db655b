// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! InfluxDB line protocol encoding.

use crate::error::AppError;
use crate::models::point::Point;
use std::fmt::Write;

/// Encode one point as a single line (no trailing newline).
///
/// Fails when the timestamp lies outside the i64 nanosecond range
/// (1677-09-21 to 2262-04-11).
pub fn encode_point(point: &Point) -> Result<String, AppError> {
    let nanos = point.timestamp().timestamp_nanos_opt().ok_or_else(|| {
        AppError::Sink(format!(
            "{} timestamp {} is outside the line protocol range",
            point.measurement(),
            point.timestamp()
        ))
    })?;

    let mut line = String::with_capacity(64);
    escape_into(&mut line, point.measurement(), &[',', ' ']);

    for (key, value) in point.tags() {
        line.push(',');
        escape_into(&mut line, key, &[',', '=', ' ']);
        line.push('=');
        escape_into(&mut line, value, &[',', '=', ' ']);
    }

    for (i, (key, value)) in point.fields().iter().enumerate() {
        line.push(if i == 0 { ' ' } else { ',' });
        escape_into(&mut line, key, &[',', '=', ' ']);
        // Writing into a String cannot fail
        let _ = write!(line, "={}", value);
    }

    let _ = write!(line, " {}", nanos);
    Ok(line)
}

/// Encode a batch, one point per line.
pub fn encode_batch(points: &[Point]) -> Result<String, AppError> {
    let lines = points
        .iter()
        .map(encode_point)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
