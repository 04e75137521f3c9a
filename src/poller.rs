//! Background jstat polling, one task per category.
//!
//! Each poller loops forever: locate the target, run
//! `jstat <flag> <pid> <interval>`, drop the header row and publish every
//! following row into the [`SampleStore`]. When jstat exits (usually because
//! the JVM went away) the child is killed and the loop starts over with a
//! fresh lookup. Only a failed lookup backs off.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::category::StatCategory;
use crate::error::ExporterError;
use crate::locator::Locate;
use crate::poller_stats::{CategoryStats, PollerStats};
use crate::store::SampleStore;

pub const DEFAULT_LOCATE_BACKOFF: Duration = Duration::from_secs(60);

/// Settings shared by all pollers.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub jstat_path: PathBuf,
    pub interval_ms: u64,
    pub locate_backoff: Duration,
}

pub struct SamplePoller<L> {
    category: StatCategory,
    locator: Arc<L>,
    store: Arc<SampleStore>,
    stats: Arc<PollerStats>,
    config: Arc<PollerConfig>,
}

impl<L: Locate> SamplePoller<L> {
    pub fn new(
        category: StatCategory,
        locator: Arc<L>,
        store: Arc<SampleStore>,
        stats: Arc<PollerStats>,
        config: Arc<PollerConfig>,
    ) -> Self {
        Self {
            category,
            locator,
            store,
            stats,
            config,
        }
    }

    /// Arguments passed to jstat for `pid`.
    pub fn jstat_args(&self, pid: &str) -> [String; 3] {
        [
            self.category.flag().to_string(),
            pid.to_string(),
            self.config.interval_ms.to_string(),
        ]
    }

    /// Runs the locate/stream/restart loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let stats = self.stats.category(self.category);
        info!("Starting {} poller", self.category);

        while !cancel.is_cancelled() {
            let located = tokio::select! {
                res = self.locator.locate() => res,
                _ = cancel.cancelled() => break,
            };

            let pid = match located {
                Ok(pid) => pid,
                Err(e) => {
                    stats.record_locate_failure();
                    warn!(
                        "{} poller: {} - retrying in {:?}",
                        self.category, e, self.config.locate_backoff
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.locate_backoff) => {}
                        _ = cancel.cancelled() => break,
                    }
                    continue;
                }
            };

            stats.set_pid(Some(pid.clone()));
            let outcome = self.poll_once(&pid, stats, &cancel).await;
            stats.set_pid(None);
            if cancel.is_cancelled() {
                break;
            }

            match outcome {
                Ok(published) => {
                    stats.record_restart();
                    info!(
                        "Finished jstat {} for pid {} after {} samples... restart",
                        self.category.flag(),
                        pid,
                        published
                    );
                }
                Err(e) => {
                    stats.record_spawn_failure();
                    error!("{} poller: {}", self.category, e);
                    // No backoff on this path; yield so a ready locator
                    // cannot starve the runtime.
                    tokio::task::yield_now().await;
                }
            }
        }

        info!("{} poller stopped", self.category);
    }

    /// One polling session against `pid`. Returns the number of published
    /// samples once jstat's output ends.
    async fn poll_once(
        &self,
        pid: &str,
        stats: &CategoryStats,
        cancel: &CancellationToken,
    ) -> Result<u64, ExporterError> {
        let args = self.jstat_args(pid);
        debug!("Launching {} {}", self.config.jstat_path.display(), args.join(" "));

        let mut child = Command::new(&self.config.jstat_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExporterError::Spawn {
                program: self.config.jstat_path.display().to_string(),
                source,
            })?;

        let published = match child.stdout.take() {
            Some(stdout) => {
                let reader = BufReader::new(stdout);
                tokio::select! {
                    n = stream_samples(reader, self.category, &self.store, stats) => n,
                    _ = cancel.cancelled() => 0,
                }
            }
            None => 0,
        };

        kill_process(&mut child).await;
        Ok(published)
    }
}

/// Publishes every line after the first into `store` until `reader` ends.
///
/// The first line is jstat's column header and is dropped whatever it holds.
pub async fn stream_samples<R>(
    reader: R,
    category: StatCategory,
    store: &SampleStore,
    stats: &CategoryStats,
) -> u64
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut first = true;
    let mut published = 0u64;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if first {
                    first = false;
                    continue;
                }
                store.put(category, line);
                stats.record_sample();
                published += 1;
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Error reading jstat {} output: {}", category.flag(), e);
                break;
            }
        }
    }

    published
}

async fn kill_process(child: &mut Child) {
    if let Err(e) = child.kill().await {
        error!("Error killing jstat process: {}", e);
    }
}
