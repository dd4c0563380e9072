//! Startup orchestration.
//!
//! # Responsibilities
//! - Prepare the search root
//! - Start the metrics exporter
//! - Build the HTTP server from validated config
//! - Bind and serve, over TLS when certificates are present
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Missing TLS files fall back to plain HTTP with a warning

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::tls;
use crate::observability::metrics;
use crate::resolver::RelayBuildError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address {0}")]
    BindAddress(String),

    #[error("failed to prepare search root: {0}")]
    SearchRoot(#[source] std::io::Error),

    #[error(transparent)]
    Relay(#[from] RelayBuildError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the service until a shutdown signal arrives.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let addr: SocketAddr = config
        .listener
        .bind_address
        .parse()
        .map_err(|_| StartupError::BindAddress(config.listener.bind_address.clone()))?;

    let root = &config.storage.search_root;
    if config.storage.create_search_root && !tokio::fs::try_exists(root).await.unwrap_or(false) {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(StartupError::SearchRoot)?;
        tracing::info!(path = %root.display(), "Created search root");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(metrics_addr) => metrics::init_metrics(metrics_addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::info!(
        search_root = %root.display(),
        identity = %config.relay.identity,
        peers = ?config.relay.peers.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        relay_timeout_secs = config.relay.timeout_secs,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let tls_config = match &config.listener.tls {
        Some(tls_settings) => tls::load_if_present(tls_settings).await?,
        None => None,
    };

    let server = HttpServer::new(config)?;
    match tls_config {
        Some(rustls) => server.run_tls(addr, rustls, shutdown.subscribe()).await?,
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown.subscribe()).await?
        }
    }

    Ok(())
}
