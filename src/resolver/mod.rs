//! Asset resolution subsystem.
//!
//! # Data Flow
//! ```text
//! GET /<mount>/<relative path>  (+ optional X-Proxy-From)
//!     → path.rs (validate relative path)
//!     → local.rs (direct > ticket-scoped > Contracts > Images)
//!         hit  → Resolution::Local
//!     → hop.rs (marker names a known peer?)
//!         yes  → Resolution::NotFound, no outbound calls
//!     → relay.rs (file store, then legacy peers, 5s each)
//!         200  → Resolution::Relayed
//!     → Resolution::NotFound
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing is cached, written or moved
//! - Local I/O faults are errors; peer failures are misses
//! - Configuration is injected once; no ambient environment reads

pub mod content_type;
pub mod error;
pub mod hop;
pub mod local;
pub mod path;
pub mod relay;

use std::collections::HashSet;
use std::time::Instant;

use crate::config::{RelayConfig, StorageConfig};
use crate::observability::metrics;

pub use error::{RelayBuildError, RelayMiss, ResolveError};
pub use hop::{HopContext, X_PROXY_FROM};
pub use local::{LocalFile, LocalResolver};
pub use path::RelativePath;
pub use relay::{PeerRelay, RelayedFile};

/// Outcome of resolving one asset request.
#[derive(Debug)]
pub enum Resolution {
    Local(LocalFile),
    Relayed(RelayedFile),
    NotFound,
}

impl Resolution {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Local(_) => "local",
            Resolution::Relayed(_) => "relayed",
            Resolution::NotFound => "not_found",
        }
    }
}

/// Local lookup followed by the peer relay chain.
#[derive(Debug)]
pub struct FileResolver {
    local: LocalResolver,
    relay: PeerRelay,
    known_peers: HashSet<String>,
}

impl FileResolver {
    pub fn new(local: LocalResolver, relay: PeerRelay, extra_known: &[String]) -> Self {
        let known_peers = relay
            .peers()
            .iter()
            .map(|p| p.name.clone())
            .chain(extra_known.iter().cloned())
            .collect();
        Self {
            local,
            relay,
            known_peers,
        }
    }

    pub fn from_config(storage: &StorageConfig, relay: &RelayConfig) -> Result<Self, RelayBuildError> {
        Ok(Self::new(
            LocalResolver::new(&storage.search_root),
            PeerRelay::new(relay, &storage.mount)?,
            &relay.known_peers,
        ))
    }

    pub fn known_peers(&self) -> &HashSet<String> {
        &self.known_peers
    }

    /// Resolve `path` for a request arriving with `hop`.
    pub async fn resolve(&self, path: &RelativePath, hop: &HopContext) -> Result<Resolution, ResolveError> {
        let start = Instant::now();
        let result = self.resolve_inner(path, hop).await;

        match &result {
            Ok(resolution) => metrics::record_resolution(resolution.label(), start),
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Local asset lookup failed");
                metrics::record_resolution("error", start);
            }
        }
        result
    }

    async fn resolve_inner(&self, path: &RelativePath, hop: &HopContext) -> Result<Resolution, ResolveError> {
        if let Some(found) = self.local.find(path).await? {
            return Ok(Resolution::Local(found));
        }

        if hop.is_loop(&self.known_peers) {
            tracing::debug!(
                path = %path,
                origin = hop.origin().unwrap_or_default(),
                "Relayed request missed locally, not relaying again"
            );
            return Ok(Resolution::NotFound);
        }

        Ok(match self.relay.fetch(path).await {
            Some(relayed) => Resolution::Relayed(relayed),
            None => Resolution::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PeerConfig;

    fn rel(raw: &str) -> RelativePath {
        RelativePath::parse(raw).unwrap()
    }

    fn relay_config(peers: &[&str]) -> RelayConfig {
        RelayConfig {
            peers: peers
                .iter()
                .map(|name| PeerConfig {
                    name: name.to_string(),
                    // Port 9 (discard) on loopback refuses quickly.
                    base_url: "http://127.0.0.1:9".to_string(),
                    path_rule: None,
                })
                .collect(),
            known_peers: vec!["tenders".to_string()],
            ..RelayConfig::default()
        }
    }

    #[test]
    fn known_peers_include_configured_and_extra() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FileResolver::new(
            LocalResolver::new(dir.path()),
            PeerRelay::new(&relay_config(&["file-store"]), "files").unwrap(),
            &["tenders".to_string()],
        );
        assert!(resolver.known_peers().contains("file-store"));
        assert!(resolver.known_peers().contains("tenders"));
        assert!(!resolver.known_peers().contains("asset-relay"));
    }

    #[tokio::test]
    async fn local_hit_ignores_loop_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Images")).unwrap();
        std::fs::write(dir.path().join("Images/a.png"), b"png").unwrap();

        let storage = StorageConfig {
            search_root: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        let resolver = FileResolver::from_config(&storage, &relay_config(&["file-store"])).unwrap();

        let resolution = resolver
            .resolve(&rel("Images/a.png"), &HopContext::from_peer("file-store"))
            .await
            .unwrap();
        assert!(matches!(resolution, Resolution::Local(_)));
    }

    #[tokio::test]
    async fn loop_marker_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageConfig {
            search_root: dir.path().to_path_buf(),
            ..StorageConfig::default()
        };
        let resolver = FileResolver::from_config(&storage, &relay_config(&["file-store"])).unwrap();

        let resolution = resolver
            .resolve(&rel("missing.png"), &HopContext::from_peer("tenders"))
            .await
            .unwrap();
        assert!(matches!(resolution, Resolution::NotFound));
    }
}
