//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging and metrics
//! - Construct the dispatcher once and bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing config file is not an error; defaults apply
//! - The listener is bound last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, AppConfig, ConfigError};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::{logging, metrics};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("listener: {0}")]
    Io(#[from] std::io::Error),
}

/// Read the configuration, falling back to defaults when the file is absent.
pub fn read_config(path: &Path) -> Result<AppConfig, StartupError> {
    if path.exists() {
        Ok(load_config(path)?)
    } else {
        Ok(AppConfig::default())
    }
}

/// Boot the gateway and serve until a termination signal arrives.
pub async fn run(config_path: &Path) -> Result<(), StartupError> {
    let config = read_config(config_path)?;
    logging::init_logging(&config.log, config.server.mode);

    if !config_path.exists() {
        tracing::warn!(path = %config_path.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        title = %config.meta.title,
        version = %config.meta.version,
        bind_address = %config.server.bind_address,
        request_timeout_ms = config.server.request_timeout_ms,
        mode = ?config.server.mode,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config);

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.signalled()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
