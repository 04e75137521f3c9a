//! Health check endpoint handler.
//!
//! Returns the poller table as plain text. The status is 200 once every
//! category holds a sample and 503 before that (or when no JVM was found).

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::category::StatCategory;
use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let populated = state.store.populated();
    let total = StatCategory::ALL.len();

    let (status, message) = if populated == total {
        (StatusCode::OK, "OK".to_string())
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Waiting for samples ({populated}/{total} categories)"),
        )
    };

    let uptime_str = format_uptime(state.start_time.elapsed().as_secs());
    let target = state.config.target.as_deref().unwrap_or("<first JVM>");
    let table = state.poller_stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("{message}\n\nTarget: {target}\nUptime: {uptime_str}\n\n{table}"),
    )
}

fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}
