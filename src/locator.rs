//! Target JVM discovery through `jps`.
//!
//! The locator never retries; the poller owns the backoff policy.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error};

use crate::error::ExporterError;

/// Names `jps` reports for the JDK tools themselves.
const EXCLUDED_NAMES: [&str; 2] = ["Jps", "Jstat"];

/// Resolves the pid of the process to sample.
pub trait Locate: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<String, ExporterError>> + Send;
}

/// Locator backed by the `jps` process lister.
#[derive(Debug, Clone)]
pub struct JpsLocator {
    jps_path: PathBuf,
    target: Option<String>,
}

impl JpsLocator {
    pub fn new(jps_path: impl Into<PathBuf>, target: Option<String>) -> Self {
        Self {
            jps_path: jps_path.into(),
            target: target.filter(|t| !t.is_empty()),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl Locate for JpsLocator {
    async fn locate(&self) -> Result<String, ExporterError> {
        let output = Command::new(&self.jps_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExporterError::Spawn {
                program: self.jps_path.display().to_string(),
                source,
            })?;

        let listing = String::from_utf8_lossy(&output.stdout);
        debug!("jps returned {} lines", listing.lines().count());

        find_target_pid(&listing, self.target()).map_err(|e| {
            error!("{}", e);
            e
        })
    }
}

/// Picks the target pid out of a `jps` listing of `"<pid> <name>"` lines.
///
/// Lines that are not exactly two tokens are ignored, as are the JDK tools
/// themselves. Without a target the first remaining entry wins.
pub fn find_target_pid(listing: &str, target: Option<&str>) -> Result<String, ExporterError> {
    for line in listing.lines() {
        let mut items = line.split_whitespace();
        let (Some(pid), Some(name), None) = (items.next(), items.next(), items.next()) else {
            continue;
        };

        if EXCLUDED_NAMES.contains(&name) {
            continue;
        }

        match target {
            Some(wanted) if name != wanted => continue,
            _ => return Ok(pid.to_string()),
        }
    }

    Err(ExporterError::TargetNotFound {
        target: target.unwrap_or_default().to_string(),
    })
}
