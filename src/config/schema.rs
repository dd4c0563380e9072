//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the asset relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Where stored assets live and how they are mounted.
    pub storage: StorageConfig,

    /// Sibling services consulted when an asset is missing locally.
    pub relay: RelayConfig,

    /// Cross-origin policy for browser clients.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,

    /// Optional TLS configuration. Ignored when the files are missing.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// On-disk asset layout.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Search root holding `Contracts/`, `Images/` and `tickets/<id>/`.
    pub search_root: PathBuf,

    /// URL segment under which assets are served and relayed.
    pub mount: String,

    /// Pre-migration flat uploads directory, consulted by the legacy route only.
    pub legacy_uploads_dir: Option<PathBuf>,

    /// URL segment of the legacy flat uploads route.
    pub legacy_mount: String,

    /// Create the search root at startup when it does not exist.
    pub create_search_root: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            search_root: PathBuf::from("public/files"),
            mount: "files".to_string(),
            legacy_uploads_dir: Some(PathBuf::from("uploads")),
            legacy_mount: "uploads".to_string(),
            create_search_root: true,
        }
    }
}

/// Peer relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Name this service announces in the proxy-origin header.
    pub identity: String,

    /// Per-peer timeout, in seconds, until response headers arrive.
    pub timeout_secs: u64,

    /// Peers in priority order. The first entry is the primary file store.
    pub peers: Vec<PeerConfig>,

    /// Additional peer identities that are recognized for loop prevention
    /// even though no relay target is configured for them.
    pub known_peers: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            identity: "asset-relay".to_string(),
            timeout_secs: 5,
            peers: Vec::new(),
            known_peers: Vec::new(),
        }
    }
}

/// A sibling service that may hold assets this instance does not.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PeerConfig {
    /// Peer identity, matched against inbound proxy-origin markers.
    pub name: String,

    /// Base URL (e.g., "http://file-store:4003").
    pub base_url: String,

    /// Optional rewrite applied to the relayed path for this peer only.
    #[serde(default)]
    pub path_rule: Option<PathRule>,
}

/// Per-peer path normalization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathRule {
    /// Replace the first non-terminal segment equal to `from` (ASCII
    /// case-insensitive) with `to`.
    RenameSegment { from: String, to: String },
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins allowed. Empty means any origin.
    pub allowed_origins: Vec<String>,

    /// Host suffixes allowed regardless of the exact list (tunnels, previews).
    pub allowed_origin_suffixes: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allowed_origin_suffixes: vec!["ngrok.app".to_string(), "ngrok.io".to_string()],
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed to produce response headers, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
