//! Exporter self-metrics.
//!
//! The jstat gauges themselves come from [`crate::collector::JstatCollector`];
//! this module holds the metrics describing the exporter and its pollers.
//! Poller counters live as atomics in [`PollerStats`] and are turned into
//! fresh metric families on every gather, so overlapping scrapes never write
//! to shared metric state.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, IntCounterVec, Opts, Registry};
use tracing::error;

use crate::category::StatCategory;
use crate::poller_stats::{CategoryStats, PollerStats};

const CATEGORY_LABEL: &str = "category";

/// Counter name and help, in the order of [`counter_values`].
const POLLER_COUNTERS: [(&str, &str); 4] = [
    (
        "jstat_exporter_poller_samples_total",
        "jstat rows published per category",
    ),
    (
        "jstat_exporter_poller_restarts_total",
        "Times the jstat subprocess ended and was restarted",
    ),
    (
        "jstat_exporter_poller_locate_failures_total",
        "Failed target JVM lookups",
    ),
    (
        "jstat_exporter_poller_spawn_failures_total",
        "Failed jstat launches",
    ),
];

fn counter_values(c: &CategoryStats) -> [u64; 4] {
    [
        c.samples.load(Ordering::Relaxed),
        c.restarts.load(Ordering::Relaxed),
        c.locate_failures.load(Ordering::Relaxed),
        c.spawn_failures.load(Ordering::Relaxed),
    ]
}

const SAMPLE_AGE_NAME: &str = "jstat_exporter_poller_sample_age_seconds";
const SAMPLE_AGE_HELP: &str = "Seconds since the last jstat row was published";

#[derive(Clone)]
pub struct ExporterMetrics {
    pub scrape_duration: Gauge,
}

impl ExporterMetrics {
    /// Creates and registers all self-metrics with the registry.
    pub fn new(
        registry: &Registry,
        stats: Arc<PollerStats>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let scrape_duration = Gauge::new(
            "jstat_exporter_scrape_duration_seconds",
            "Time spent serving the previous metrics request",
        )?;

        registry.register(Box::new(scrape_duration.clone()))?;
        registry.register(Box::new(PollerCollector::new(stats)?))?;

        Ok(Self { scrape_duration })
    }
}

/// Exposes [`PollerStats`] counters and sample ages per category.
pub struct PollerCollector {
    stats: Arc<PollerStats>,
    // Never written; only carry the descriptors.
    templates: Vec<IntCounterVec>,
    age_template: GaugeVec,
}

fn counter_vec(name: &str, help: &str) -> prometheus::Result<IntCounterVec> {
    IntCounterVec::new(Opts::new(name, help), &[CATEGORY_LABEL])
}

fn age_vec() -> prometheus::Result<GaugeVec> {
    GaugeVec::new(Opts::new(SAMPLE_AGE_NAME, SAMPLE_AGE_HELP), &[CATEGORY_LABEL])
}

impl PollerCollector {
    pub fn new(stats: Arc<PollerStats>) -> prometheus::Result<Self> {
        let templates = POLLER_COUNTERS
            .iter()
            .map(|(name, help)| counter_vec(name, help))
            .collect::<prometheus::Result<Vec<_>>>()?;

        Ok(Self {
            stats,
            templates,
            age_template: age_vec()?,
        })
    }

    /// Builds the poller families from the current atomics.
    fn build(&self) -> prometheus::Result<Vec<MetricFamily>> {
        let mut families = Vec::with_capacity(POLLER_COUNTERS.len() + 1);

        let vecs = POLLER_COUNTERS
            .iter()
            .map(|(name, help)| counter_vec(name, help))
            .collect::<prometheus::Result<Vec<_>>>()?;
        for category in StatCategory::ALL {
            let values = counter_values(self.stats.category(category));
            for (vec, value) in vecs.iter().zip(values) {
                vec.with_label_values(&[category.label()]).inc_by(value);
            }
        }
        for vec in &vecs {
            families.extend(vec.collect());
        }

        // Categories that never published have no age series.
        let ages = age_vec()?;
        for category in StatCategory::ALL {
            if let Some(age) = self.stats.category(category).last_sample_age_secs() {
                ages.with_label_values(&[category.label()]).set(age);
            }
        }
        families.extend(ages.collect());

        Ok(families)
    }
}

impl Collector for PollerCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.templates
            .iter()
            .flat_map(|v| v.desc())
            .chain(self.age_template.desc())
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.build().unwrap_or_else(|e| {
            error!("Failed to build poller metrics: {}", e);
            Vec::new()
        })
    }
}
