// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! fitbit-ingest
//!
//! Pulls the latest Fitbit metrics and writes them to InfluxDB. Meant to be
//! started by an external scheduler; every failure ends the run with a
//! non-zero exit status and the next scheduled run is the retry.

use fitbit_ingest::config::Config;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        database = %config.fitbit_database,
        timezone = %config.timezone,
        "Starting Fitbit ingestion run"
    );

    match fitbit_ingest::run(&config).await {
        Ok(count) => {
            tracing::info!(count, "Run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

/// Human-readable logs on a terminal, JSON lines otherwise (cron, containers).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fitbit_ingest=debug"));
    let registry = tracing_subscriber::registry().with(filter);

    if std::io::stdout().is_terminal() {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true),
            )
            .init();
    }
}
