use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketer_core::{
    load_config, metrics, spawn_expiration_task, validate_config, LogFormat, LoggingConfig,
    TicketSpace,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("TICKETER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("ticketer.toml"));

    // Load and validate configuration before logging so the format can be chosen
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_logging(&config.logging);

    info!(version = VERSION, "Starting ticketerd");
    info!("Configuration loaded from {:?}", config_path);
    debug!(
        config = %serde_json::to_string(&config).unwrap_or_default(),
        "Effective configuration"
    );

    let registry = Registry::new();
    for metric in metrics::all_metrics() {
        registry
            .register(metric)
            .context("Failed to register metrics")?;
    }

    let space = Arc::new(
        TicketSpace::try_new(&config.space.path).with_context(|| {
            format!("Failed to prepare ticket space at {:?}", config.space.path)
        })?,
    );
    if let Some(ttl) = config.space.ttl() {
        space.set_ttl(ttl);
    }
    if config.space.sequencing {
        space.enable_sequencing();
    } else {
        warn!("Sequencing disabled; the expiration loop will not run");
    }
    info!(path = %space.path().display(), "Ticket space ready");

    let (cancel, handle) = spawn_expiration_task(Arc::clone(&space), config.sweeper.interval());

    shutdown_signal().await;
    info!("Shutting down...");

    cancel.cancel();
    handle.await.context("Expiration task failed")?;
    info!("Expiration loop stopped");

    log_metrics(&registry);

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.filter.as_str().into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Dump final counter values at shutdown.
fn log_metrics(registry: &Registry) {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
        return;
    }
    debug!("Final metrics:\n{}", String::from_utf8_lossy(&buffer));
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
