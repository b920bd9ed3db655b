// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitbit-ingest: pull Fitbit metrics into InfluxDB
//!
//! A single scheduled run authorizes against the Fitbit Web API, fetches
//! devices, sleep, daily series, heart rate and the activity log, normalizes
//! every payload into time-series points and writes them to InfluxDB in
//! fixed-size chunks.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod run;
pub mod services;
pub mod time_utils;

pub use run::{run, run_with_sink, RunWindow};
