//! Configuration management for jstat-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use crate::collector::MalformedPolicy;
use crate::error::ExporterError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9010";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_JSTAT_PATH: &str = "/usr/bin/jstat";
pub const DEFAULT_JPS_PATH: &str = "jps";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_LOCATE_BACKOFF_SECS: u64 = 60;

/// Effective exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    #[serde(alias = "listen-address")]
    pub listen_address: Option<String>,
    #[serde(alias = "metrics-path")]
    pub metrics_path: Option<String>,
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Sampling
    #[serde(alias = "jstat-path")]
    pub jstat_path: Option<PathBuf>,
    #[serde(alias = "jps-path")]
    pub jps_path: Option<PathBuf>,
    pub target: Option<String>,
    #[serde(alias = "interval-ms")]
    pub interval_ms: Option<u64>,
    #[serde(alias = "locate-backoff-secs")]
    pub locate_backoff_secs: Option<u64>,
    #[serde(alias = "on-malformed")]
    pub on_malformed: Option<MalformedPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: Some(DEFAULT_LISTEN_ADDRESS.to_string()),
            metrics_path: Some(DEFAULT_METRICS_PATH.to_string()),
            enable_health: Some(true),
            jstat_path: Some(PathBuf::from(DEFAULT_JSTAT_PATH)),
            jps_path: Some(PathBuf::from(DEFAULT_JPS_PATH)),
            target: None,
            interval_ms: Some(DEFAULT_INTERVAL_MS),
            locate_backoff_secs: Some(DEFAULT_LOCATE_BACKOFF_SECS),
            on_malformed: Some(MalformedPolicy::Exit),
        }
    }
}

impl Config {
    pub fn metrics_path(&self) -> &str {
        self.metrics_path.as_deref().unwrap_or(DEFAULT_METRICS_PATH)
    }

    pub fn jstat_path(&self) -> PathBuf {
        self.jstat_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JSTAT_PATH))
    }

    pub fn jps_path(&self) -> PathBuf {
        self.jps_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JPS_PATH))
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS)
    }

    pub fn locate_backoff_secs(&self) -> u64 {
        self.locate_backoff_secs
            .unwrap_or(DEFAULT_LOCATE_BACKOFF_SECS)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ExporterError> {
        parse_listen_address(
            self.listen_address
                .as_deref()
                .unwrap_or(DEFAULT_LISTEN_ADDRESS),
        )
    }
}

/// Resolves a `host:port` listen address; a bare `:port` binds all
/// interfaces. Host names resolve to their first address.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, ExporterError> {
    let full = if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    };

    full.to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| ExporterError::InvalidListenAddress(addr.to_string()))
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    cfg.listen_addr()?;

    let path = cfg.metrics_path();
    if !path.starts_with('/') {
        return Err(format!("metrics_path '{}' must start with '/'", path).into());
    }
    if path == "/" {
        return Err("metrics_path must not be '/', the landing page is served there".into());
    }
    if path == "/health" && cfg.enable_health.unwrap_or(true) {
        return Err("metrics_path '/health' collides with the health endpoint".into());
    }

    if cfg.interval_ms() == 0 {
        return Err("interval_ms must be greater than 0".into());
    }

    if cfg.jstat_path().as_os_str().is_empty() {
        return Err("jstat_path must not be empty".into());
    }
    if cfg.jps_path().as_os_str().is_empty() {
        return Err("jps_path must not be empty".into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(addr) = &args.listen_address {
        config.listen_address = Some(addr.clone());
    }
    if let Some(path) = &args.metrics_path {
        config.metrics_path = Some(path.clone());
    }
    if let Some(path) = &args.jstat_path {
        config.jstat_path = Some(path.clone());
    }
    if let Some(path) = &args.jps_path {
        config.jps_path = Some(path.clone());
    }
    if let Some(target) = &args.target {
        config.target = Some(target.clone());
    }
    if let Some(interval) = args.interval {
        config.interval_ms = Some(interval);
    }
    if let Some(secs) = args.locate_backoff_secs {
        config.locate_backoff_secs = Some(secs);
    }
    if let Some(policy) = args.on_malformed {
        config.on_malformed = Some(policy);
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }

    Ok(config)
}

/// Loads a config file, or the defaults when none is found.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            let defaults = [
                "/etc/jstat-exporter/config.yaml",
                "/etc/jstat-exporter/config.yml",
                "/etc/jstat-exporter/config.json",
                "/etc/jstat-exporter/config.toml",
                "./jstat-exporter.yaml",
                "./jstat-exporter.yml",
                "./jstat-exporter.json",
                "./jstat-exporter.toml",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    let mut config = Config::default();
    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        // Default to YAML
        _ => serde_yaml::from_str(&content)?,
    };
    info!("Loaded configuration from: {}", path.display());

    config.merge(loaded);
    Ok(config)
}

impl Config {
    /// Overlays every field set in `other`.
    fn merge(&mut self, other: Config) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            listen_address,
            metrics_path,
            enable_health,
            jstat_path,
            jps_path,
            target,
            interval_ms,
            locate_backoff_secs,
            on_malformed
        );
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}
