// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models: Fitbit payloads and canonical points.

pub mod fitbit;
pub mod point;

pub use point::{FieldValue, Point, PointBuffer};
