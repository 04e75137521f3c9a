//! Metrics endpoint handler for Prometheus scraping.
//!
//! Gathering the registry runs [`crate::collector::JstatCollector`] and
//! [`crate::metrics::PollerCollector`], which build this scrape's families
//! from the sample store and the poller counters.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, MetricsError> {
    let start = Instant::now();
    debug!("Processing metrics request");

    let families = state.registry.gather();
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    if encoder.encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    // Reported on the next scrape.
    state.metrics.scrape_duration.set(start.elapsed().as_secs_f64());

    debug!(
        "Metrics request completed: {} families, {} bytes",
        families.len(),
        buffer.len()
    );

    let body = String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)?;
    Ok(([("Content-Type", encoder.format_type().to_string())], body))
}
