//! Observability metrics for the load-test worker
//!
//! Collects the figures operators watch during a soak run: request statuses,
//! transient retries, stream restarts and per-range throughput, plus the
//! per-scenario timing the external harness expects around each run.
//!
//! ## Architecture
//!
//! - Uses the `metrics` crate for low-overhead collection
//! - Prometheus exporter for the scrape endpoint
//! - All recording helpers are no-ops until [`init_metrics`] installs the
//!   exporter, so library code can record unconditionally

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

static METRICS_ADDR: OnceCell<SocketAddr> = OnceCell::new();

/// Initialize the metrics system with a Prometheus exporter.
///
/// Call once at worker startup, inside a Tokio runtime. Idempotent: repeat
/// calls are ignored.
///
/// # Errors
/// Returns an error if the exporter cannot bind `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if METRICS_ADDR.get().is_some() {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "portal_requests_total",
        Unit::Count,
        "Stream requests issued to the portal, by response status"
    );

    describe_counter!(
        "portal_transient_status_total",
        Unit::Count,
        "429/503 responses that triggered a transparent retry"
    );

    describe_counter!(
        "stream_restarts_total",
        Unit::Count,
        "Short-read restarts across all ranges"
    );

    describe_counter!(
        "stream_ranges_completed_total",
        Unit::Count,
        "Block ranges streamed to completion"
    );

    describe_counter!(
        "stream_bytes_total",
        Unit::Bytes,
        "Raw line bytes consumed from completed ranges"
    );

    describe_counter!(
        "stream_blocks_total",
        Unit::Count,
        "Block records delivered from completed ranges"
    );

    describe_histogram!(
        "stream_range_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of one completed range"
    );

    describe_histogram!(
        "scenario_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of one scenario run, by scenario"
    );

    let _ = METRICS_ADDR.set(addr);
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Whether the exporter has been installed.
pub fn is_initialized() -> bool {
    METRICS_ADDR.get().is_some()
}

/// Record one stream request and the status the portal answered with.
pub fn record_portal_request(status: u16) {
    counter!("portal_requests_total", "status" => status.to_string()).increment(1);
}

/// Record a transient (429/503) response.
pub fn record_transient_status(status: u16) {
    counter!("portal_transient_status_total", "status" => status.to_string()).increment(1);
}

/// Record one short-read restart.
pub fn record_stream_restart() {
    counter!("stream_restarts_total").increment(1);
}

/// Record a completed range with its aggregate figures.
pub fn record_range_complete(elapsed_secs: f64, total_bytes: u64, blocks: u64) {
    counter!("stream_ranges_completed_total").increment(1);
    counter!("stream_bytes_total").increment(total_bytes);
    counter!("stream_blocks_total").increment(blocks);
    histogram!("stream_range_duration_seconds").record(elapsed_secs);
}

/// Times one scenario run, recording the duration histogram on drop so the
/// measurement also covers failed runs.
pub struct ScenarioTimer {
    scenario: &'static str,
    started: Instant,
}

impl ScenarioTimer {
    /// Start timing a scenario run.
    pub fn start(scenario: &'static str) -> Self {
        debug!(scenario, "Scenario measurement started");
        Self {
            scenario,
            started: Instant::now(),
        }
    }
}

impl Drop for ScenarioTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        histogram!("scenario_duration_seconds", "scenario" => self.scenario)
            .record(elapsed.as_secs_f64());
        debug!(
            scenario = self.scenario,
            elapsed_ms = elapsed.as_millis() as u64,
            "Scenario measurement recorded"
        );
    }
}
