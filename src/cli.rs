//! CLI arguments and subcommands for jstat-exporter.
//!
//! Flag names follow the Prometheus exporter convention
//! (`--web.listen-address`, `--web.telemetry-path`, ...).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::collector::MalformedPolicy;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "jstat-exporter",
    about = "Prometheus exporter for JVM heap and GC statistics sampled via jstat",
    long_about = "Prometheus exporter for JVM heap and GC statistics sampled via jstat.\n\n\
                  Runs jstat -gccapacity, -gcold, -gcnew and -gc against the target JVM \
                  (located with jps), keeps the latest row of each and exposes the values \
                  as Prometheus gauges.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Address on which to expose metrics and web interface
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path")]
    pub metrics_path: Option<String>,

    /// jstat path
    #[arg(long = "jstat.path")]
    pub jstat_path: Option<PathBuf>,

    /// jps path
    #[arg(long = "jps.path")]
    pub jps_path: Option<PathBuf>,

    /// Target name of jps (default: first JVM listed)
    #[arg(long)]
    pub target: Option<String>,

    /// jstat sampling interval in milliseconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Seconds to wait before retrying when no target JVM is found
    #[arg(long)]
    pub locate_backoff_secs: Option<u64>,

    /// Behaviour when a jstat row cannot be parsed at scrape time
    #[arg(long, value_enum)]
    pub on_malformed: Option<MalformedPolicy>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the target JVM and check that jstat can be run
    Check,
}
