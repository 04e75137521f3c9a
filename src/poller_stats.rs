//! Per-category poller statistics.
//!
//! Pollers record into these counters; the `/health` endpoint and the
//! exporter self-metrics read them.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock as StdRwLock;
use std::time::Instant;

use crate::category::StatCategory;

/// Counters for one poller.
#[derive(Default)]
pub struct CategoryStats {
    pub samples: AtomicU64,
    pub restarts: AtomicU64,
    pub locate_failures: AtomicU64,
    pub spawn_failures: AtomicU64,
    last_sample: StdRwLock<Option<Instant>>,
    current_pid: StdRwLock<Option<String>>,
}

impl CategoryStats {
    pub fn record_sample(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_sample.write() {
            *guard = Some(Instant::now());
        }
    }

    pub fn record_restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_locate_failure(&self) {
        self.locate_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spawn_failure(&self) {
        self.spawn_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_pid(&self, pid: Option<String>) {
        if let Ok(mut guard) = self.current_pid.write() {
            *guard = pid;
        }
    }

    pub fn pid(&self) -> Option<String> {
        self.current_pid.read().ok().and_then(|g| g.clone())
    }

    /// Seconds since the last published sample, if any.
    pub fn last_sample_age_secs(&self) -> Option<f64> {
        self.last_sample
            .read()
            .ok()
            .and_then(|g| g.map(|t| t.elapsed().as_secs_f64()))
    }
}

pub struct PollerStats {
    categories: HashMap<StatCategory, CategoryStats>,
    pub start_time: Instant,
}

impl Default for PollerStats {
    fn default() -> Self {
        Self {
            categories: StatCategory::ALL
                .iter()
                .map(|&c| (c, CategoryStats::default()))
                .collect(),
            start_time: Instant::now(),
        }
    }
}

impl PollerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: StatCategory) -> &CategoryStats {
        // Every category is inserted in `default()`.
        &self.categories[&category]
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();

        writeln!(out, "POLLER STATS").ok();
        writeln!(out, "============").ok();
        writeln!(out).ok();
        writeln!(
            out,
            "{:12} | {:>8} | {:>10} | {:>9} | {:>10} | {:>10} | {:>12}",
            "Category", "PID", "Samples", "Restarts", "Locate err", "Spawn err", "Last sample"
        )
        .ok();
        writeln!(out, "{}", "-".repeat(88)).ok();

        for category in StatCategory::ALL {
            let stats = self.category(category);
            let last = stats
                .last_sample_age_secs()
                .map(|s| format!("{:.1}s ago", s))
                .unwrap_or_else(|| "never".to_string());

            writeln!(
                out,
                "{:12} | {:>8} | {:>10} | {:>9} | {:>10} | {:>10} | {:>12}",
                category.label(),
                stats.pid().unwrap_or_else(|| "-".to_string()),
                stats.samples.load(Ordering::Relaxed),
                stats.restarts.load(Ordering::Relaxed),
                stats.locate_failures.load(Ordering::Relaxed),
                stats.spawn_failures.load(Ordering::Relaxed),
                last
            )
            .ok();
        }

        out
    }
}
