//! jstat-exporter
//!
//! Entry point: resolves configuration, starts one poller per jstat view and
//! serves the metrics endpoint until SIGINT/SIGTERM.

use axum::{routing::get, Router};
use clap::Parser;
use prometheus::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};

use jstat_exporter::cli::{Args, Commands, LogLevel};
use jstat_exporter::commands::command_check;
use jstat_exporter::config::{resolve_config, show_config, validate_effective_config};
use jstat_exporter::handlers::{health_handler, metrics_handler, root_handler};
use jstat_exporter::metrics::ExporterMetrics;
use jstat_exporter::state::AppState;
use jstat_exporter::{
    ExporterError, JpsLocator, JstatCollector, PollerConfig, PollerStats, SamplePoller,
    SampleStore, StatCategory,
};

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Resolves once SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }

    if args.check_config {
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config, args.config_format);
    }

    setup_logging(&args);

    if let Some(Commands::Check) = &args.command {
        return command_check(&config).await;
    }

    info!("Starting jstat-exporter");

    let store = Arc::new(SampleStore::new());
    let poller_stats = Arc::new(PollerStats::new());

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    let metrics = ExporterMetrics::new(&registry, Arc::clone(&poller_stats))?;
    let collector = JstatCollector::new(
        Arc::clone(&store),
        config.on_malformed.unwrap_or_default(),
    )?;
    registry.register(Box::new(collector))?;

    let locator = Arc::new(JpsLocator::new(config.jps_path(), config.target.clone()));
    let poller_config = Arc::new(PollerConfig {
        jstat_path: config.jstat_path(),
        interval_ms: config.interval_ms(),
        locate_backoff: Duration::from_secs(config.locate_backoff_secs()),
    });

    let cancel = CancellationToken::new();
    let pollers: Vec<_> = StatCategory::ALL
        .iter()
        .map(|&category| {
            let poller = SamplePoller::new(
                category,
                Arc::clone(&locator),
                Arc::clone(&store),
                Arc::clone(&poller_stats),
                Arc::clone(&poller_config),
            );
            tokio::spawn(poller.run(cancel.clone()))
        })
        .collect();

    let addr = config.listen_addr()?;
    let metrics_path = config.metrics_path().to_string();
    let enable_health = config.enable_health.unwrap_or(true);

    let state = Arc::new(AppState {
        registry,
        metrics,
        store,
        poller_stats,
        config: Arc::new(config),
        start_time: Instant::now(),
    });

    // Configure HTTP server routes
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route(&metrics_path, get(metrics_handler));

    if enable_health {
        app = app.route("/health", get(health_handler));
    }

    let app = app.with_state(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ExporterError::Bind { addr, source })?;
    info!("Starting Server: {} (metrics at {})", addr, metrics_path);

    let shutdown = cancel.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        tokio::select! {
            _ = shutdown_signal() => {}
            _ = shutdown.cancelled() => {}
        }
    });

    let result = server.await;
    cancel.cancel();
    for handle in pollers {
        if let Err(e) = handle.await {
            error!("Poller task failed: {}", e);
        }
    }

    if let Err(e) = result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("jstat-exporter stopped gracefully");
    Ok(())
}
