//! Prometheus collector turning cached jstat rows into gauges.
//!
//! Parsing happens at scrape time. A category without a sample yields no
//! metrics at all. A row whose exported tokens are missing or not numeric
//! means jstat's output layout is not the one this exporter was written
//! against; under [`MalformedPolicy::Exit`] the whole exporter stops rather
//! than serve wrong values.

use std::sync::Arc;

use clap::ValueEnum;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::category::{GaugeField, StatCategory};
use crate::error::ExporterError;
use crate::store::SampleStore;

pub const NAMESPACE: &str = "jstat";

/// What to do when a cached row cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log and terminate the process with exit code 1.
    #[default]
    Exit,
    /// Log and omit the category from this scrape.
    Skip,
}

/// Parses the exported tokens of `line` for `category`, in field order.
pub fn parse_sample(category: StatCategory, line: &str) -> Result<Vec<f64>, ExporterError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    category
        .fields()
        .iter()
        .map(|field| {
            tokens
                .get(field.position)
                .and_then(|t| t.parse::<f64>().ok())
                .ok_or_else(|| ExporterError::MalformedSample {
                    category,
                    position: field.position,
                    line: line.to_string(),
                })
        })
        .collect()
}

struct CategoryGauges {
    category: StatCategory,
    // Never set; only carry the descriptors. Each scrape builds its own.
    templates: Vec<Gauge>,
}

fn gauge(field: &GaugeField) -> prometheus::Result<Gauge> {
    Gauge::with_opts(Opts::new(field.name, field.help).namespace(NAMESPACE))
}

pub struct JstatCollector {
    store: Arc<SampleStore>,
    categories: Vec<CategoryGauges>,
    policy: MalformedPolicy,
}

impl JstatCollector {
    pub fn new(store: Arc<SampleStore>, policy: MalformedPolicy) -> prometheus::Result<Self> {
        let mut categories = Vec::with_capacity(StatCategory::ALL.len());
        for category in StatCategory::ALL {
            let templates = category
                .fields()
                .iter()
                .map(gauge)
                .collect::<prometheus::Result<Vec<_>>>()?;
            categories.push(CategoryGauges {
                category,
                templates,
            });
        }

        Ok(Self {
            store,
            categories,
            policy,
        })
    }

    /// Metric families for one category; empty when no sample is cached.
    ///
    /// The families are built from fresh gauges while the store's read lock
    /// is held, so every family of one call comes from the same row.
    pub fn collect_category(
        &self,
        category: StatCategory,
    ) -> Result<Vec<MetricFamily>, ExporterError> {
        let built = self.store.with_sample(category, |line| {
            let values = parse_sample(category, line)?;
            let mut families = Vec::with_capacity(values.len());
            for (field, value) in category.fields().iter().zip(values) {
                let g = gauge(field)?;
                g.set(value);
                families.extend(g.collect());
            }
            Ok::<_, ExporterError>(families)
        });

        built.unwrap_or_else(|| Ok(Vec::new()))
    }

    fn handle_error(&self, e: ExporterError) {
        match (&e, self.policy) {
            (ExporterError::MalformedSample { .. }, MalformedPolicy::Exit) => {
                error!("{}", e);
                std::process::exit(1);
            }
            (ExporterError::MalformedSample { .. }, MalformedPolicy::Skip) => {
                warn!("{} - omitting category from scrape", e);
            }
            _ => error!("Failed to build jstat metrics: {}", e),
        }
    }
}

impl Collector for JstatCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.categories
            .iter()
            .flat_map(|c| c.templates.iter())
            .flat_map(|g| g.desc())
            .collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = Vec::new();
        for entry in &self.categories {
            match self.collect_category(entry.category) {
                Ok(mut mfs) => families.append(&mut mfs),
                Err(e) => self.handle_error(e),
            }
        }
        families
    }
}
