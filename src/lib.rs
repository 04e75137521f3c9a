//! jstat exporter library
//!
//! Samples a JVM's heap and garbage-collection statistics by running `jstat`
//! once per statistic view, keeps the newest row of each view in a
//! [`SampleStore`] and exposes the values as Prometheus gauges through
//! [`JstatCollector`].
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use jstat_exporter::{JstatCollector, MalformedPolicy, SampleStore, StatCategory};
//! use prometheus::Registry;
//!
//! let store = Arc::new(SampleStore::new());
//! let registry = Registry::new();
//! let collector = JstatCollector::new(Arc::clone(&store), MalformedPolicy::Skip).unwrap();
//! registry.register(Box::new(collector)).unwrap();
//!
//! // Normally published by a `SamplePoller`.
//! store.put(StatCategory::OldGen, "0.0 31744.0 0.0 0.0 87040.0 4096.0");
//! assert_eq!(registry.gather().len(), 2);
//! ```

pub mod category;
pub mod cli;
pub mod collector;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod locator;
pub mod metrics;
pub mod poller;
pub mod poller_stats;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use category::{GaugeField, StatCategory};
pub use collector::{JstatCollector, MalformedPolicy};
pub use error::ExporterError;
pub use locator::{JpsLocator, Locate};
pub use poller::{PollerConfig, SamplePoller};
pub use poller_stats::PollerStats;
pub use store::SampleStore;
