// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chunked delivery of the point buffer to the sink.

use crate::db::PointSink;
use crate::error::AppError;
use crate::models::point::Point;

/// Writes points in consecutive fixed-size chunks.
///
/// Chunks are sent in order, one at a time. A failed chunk stops the flush;
/// chunks already written stay written.
#[derive(Debug, Clone, Copy)]
pub struct BatchWriter {
    chunk_size: usize,
}

impl BatchWriter {
    /// `chunk_size` of zero is treated as one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of write calls needed for `len` points.
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }

    /// Write all `points` and return how many were written.
    pub async fn flush<S: PointSink>(
        &self,
        sink: &mut S,
        points: &[Point],
    ) -> Result<usize, AppError> {
        let total = points.len();
        let mut written = 0;

        for chunk in points.chunks(self.chunk_size) {
            sink.write_points(chunk).await.map_err(|e| {
                tracing::error!(written, total, error = %e, "Unable to write points to InfluxDB");
                e
            })?;
            written += chunk.len();
            tracing::debug!("Wrote {} / {} points", written, total);
        }

        tracing::info!(count = total, "Successfully wrote data points to InfluxDB");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Records every chunk; fails on the chunk with index `fail_at`.
    #[derive(Default)]
    struct RecordingSink {
        chunks: Vec<Vec<Point>>,
        fail_at: Option<usize>,
    }

    impl PointSink for RecordingSink {
        async fn create_database(&mut self, _name: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn switch_database(&mut self, _name: &str) -> Result<(), AppError> {
            Ok(())
        }

        async fn write_points(&mut self, points: &[Point]) -> Result<(), AppError> {
            if self.fail_at == Some(self.chunks.len()) {
                return Err(AppError::Sink("HTTP 500".to_string()));
            }
            self.chunks.push(points.to_vec());
            Ok(())
        }
    }

    fn points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::value("steps", Utc.timestamp_opt(i as i64, 0).unwrap(), i as i64))
            .collect()
    }

    #[tokio::test]
    async fn test_237_points_in_chunks_of_50() {
        let input = points(237);
        let mut sink = RecordingSink::default();

        let written = BatchWriter::new(50).flush(&mut sink, &input).await.unwrap();

        assert_eq!(written, 237);
        let sizes: Vec<_> = sink.chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, [50, 50, 50, 50, 37]);
        assert_eq!(sink.chunks.concat(), input);
    }

    #[tokio::test]
    async fn test_chunk_count_matches_writes() {
        for (len, size) in [(0, 5), (1, 5), (5, 5), (6, 5), (100, 1), (7, 100)] {
            let input = points(len);
            let mut sink = RecordingSink::default();
            let writer = BatchWriter::new(size);

            writer.flush(&mut sink, &input).await.unwrap();

            assert_eq!(sink.chunks.len(), writer.chunk_count(len), "len={len} size={size}");
            assert_eq!(sink.chunks.concat(), input);
        }
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_chunks() {
        let input = points(120);
        let mut sink = RecordingSink {
            fail_at: Some(1),
            ..Default::default()
        };

        let err = BatchWriter::new(50)
            .flush(&mut sink, &input)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Sink(_)));
        // The first chunk was committed and is not rolled back
        assert_eq!(sink.chunks.len(), 1);
        assert_eq!(sink.chunks[0], input[..50]);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        assert_eq!(BatchWriter::new(0).chunk_size(), 1);
    }
}
