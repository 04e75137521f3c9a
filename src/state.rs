//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. Pollers only receive the store and the stats.

use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::poller_stats::PollerStats;
use crate::store::SampleStore;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    /// Registry holding the jstat collector and the self-metrics.
    pub registry: Registry,
    pub metrics: ExporterMetrics,
    pub store: Arc<SampleStore>,
    pub poller_stats: Arc<PollerStats>,
    pub config: Arc<Config>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
