// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitbit_ingest::config::Config;
use fitbit_ingest::db::PointSink;
use fitbit_ingest::error::AppError;
use fitbit_ingest::models::Point;
use std::path::Path;

/// Read a JSON fixture from `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e))
}

/// Config pointing the Fitbit client at a mock server and the token file into `dir`.
#[allow(dead_code)]
pub fn test_config(api_url: &str, dir: &Path) -> Config {
    Config {
        fitbit_api_url: api_url.to_string(),
        refresh_token_file: dir.join(".fitbit-refreshtoken"),
        ..Config::test_default()
    }
}

/// In-memory sink recording every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingSink {
    pub created: Vec<String>,
    pub selected: Option<String>,
    pub chunks: Vec<Vec<Point>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn points(&self) -> Vec<Point> {
        self.chunks.concat()
    }
}

impl PointSink for RecordingSink {
    async fn create_database(&mut self, name: &str) -> Result<(), AppError> {
        self.created.push(name.to_string());
        Ok(())
    }

    async fn switch_database(&mut self, name: &str) -> Result<(), AppError> {
        self.selected = Some(name.to_string());
        Ok(())
    }

    async fn write_points(&mut self, points: &[Point]) -> Result<(), AppError> {
        self.chunks.push(points.to_vec());
        Ok(())
    }
}
