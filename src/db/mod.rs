// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-series sink (InfluxDB).

pub mod batch;
pub mod influx;
pub mod line_protocol;

pub use batch::BatchWriter;
pub use influx::InfluxSink;

use crate::error::AppError;
use crate::models::point::Point;

/// Destination for normalized points.
#[allow(async_fn_in_trait)]
pub trait PointSink {
    /// Create `name` if it does not exist yet.
    async fn create_database(&mut self, name: &str) -> Result<(), AppError>;

    /// Direct subsequent writes to `name`.
    async fn switch_database(&mut self, name: &str) -> Result<(), AppError>;

    /// Write one batch of points.
    async fn write_points(&mut self, points: &[Point]) -> Result<(), AppError>;
}
