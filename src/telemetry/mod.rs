//! Telemetry module
//!
//! Structured logging with tracing. Log output goes to stderr so that
//! stdout carries only the run report.

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{BenchError, BenchResult};

/// Initialize the telemetry subsystem
pub fn init_telemetry(config: &TelemetryConfig) -> BenchResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| BenchError::Config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(false)
            .with_line_number(false)
            .with_target(false)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };
    result.map_err(|e| BenchError::Internal(format!("Failed to install subscriber: {}", e)))?;

    tracing::debug!(
        service = %config.service_name,
        version = %env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Log the start of a run
#[inline]
pub fn log_run_start(mode: &str, target: &str) {
    tracing::info!(mode = %mode, target = %target, "Run started");
}

/// Log the end of a run
#[inline]
pub fn log_run_end(mode: &str, elapsed: Duration, successes: u64, errors: u64) {
    tracing::info!(
        mode = %mode,
        elapsed_ms = elapsed.as_millis() as u64,
        successes,
        errors,
        "Run completed"
    );
}
