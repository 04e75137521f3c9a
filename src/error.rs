//! Error types for the exporter.
//!
//! Locator and spawn failures are recovered inside the poller loops; a
//! malformed sample is fatal under the default policy (see `collector`).

use std::net::SocketAddr;

use crate::category::StatCategory;

#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("No target process: {target}")]
    TargetNotFound { target: String },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {category} sample: token {position} missing or not a number in '{line}'")]
    MalformedSample {
        category: StatCategory,
        position: usize,
        line: String,
    },

    #[error("Metric construction failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Invalid listen address '{0}'")]
    InvalidListenAddress(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
