//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeouts, limits)
//! - Serve over plain TCP or rustls
//! - Stop accepting on the shutdown signal and drain in-flight requests

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::get, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::cors::cors_layer;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::shutdown::{notified, DRAIN_GRACE};
use crate::resolver::{FileResolver, LocalResolver, RelayBuildError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<FileResolver>,
    pub uploads: Arc<LocalResolver>,
    pub mount: Arc<str>,
    pub legacy_mount: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, RelayBuildError> {
        let storage = &config.storage;
        Ok(Self {
            resolver: Arc::new(FileResolver::from_config(storage, &config.relay)?),
            uploads: Arc::new(LocalResolver::legacy_uploads(
                &storage.search_root,
                storage.legacy_uploads_dir.clone(),
            )),
            mount: storage.mount.trim_matches('/').into(),
            legacy_mount: storage.legacy_mount.trim_matches('/').into(),
        })
    }
}

/// HTTP server for the asset relay.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, RelayBuildError> {
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &AppConfig, state: AppState) -> Router {
        let asset_route = format!("/{}/{{*path}}", state.mount);
        let legacy_route = format!("/{}/{{*path}}", state.legacy_mount);

        Router::new()
            .route(&asset_route, get(handlers::serve_asset))
            .route(&legacy_route, get(handlers::serve_legacy_upload))
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .route("/api/v1/health", get(handlers::health))
            .fallback(handlers::fallback)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.cors))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id(req.headers()),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mount = %self.config.storage.mount, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(notified(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        tracing::info!(address = %addr, mount = %self.config.storage.mount, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            notified(shutdown).await;
            drain.graceful_shutdown(Some(DRAIN_GRACE));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
