//! Relay of missing assets to sibling services.
//!
//! # Responsibilities
//! - Build each peer's upstream URL (mount prefix + per-peer path rule)
//! - Try peers strictly in configured order, one attempt each
//! - Bound every attempt by a deadline on the response headers
//! - Hand back the first 200 response for streaming
//!
//! # Design Decisions
//! - Misses (timeout, connect error, non-200) are logged and swallowed
//! - The deadline covers time-to-headers only; the body streams unbounded
//! - No retries against the same peer

use std::time::{Duration, Instant};

use axum::http::HeaderValue;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::config::{PathRule, PeerConfig, RelayConfig};
use crate::observability::metrics;
use crate::resolver::error::{RelayBuildError, RelayMiss};
use crate::resolver::hop::X_PROXY_FROM;
use crate::resolver::path::RelativePath;

/// A configured relay target.
#[derive(Debug, Clone)]
pub struct Peer {
    pub name: String,
    pub base_url: Url,
    pub path_rule: Option<PathRule>,
}

impl Peer {
    pub fn from_config(config: &PeerConfig) -> Result<Self, RelayBuildError> {
        let base_url = Url::parse(&config.base_url).map_err(|source| RelayBuildError::InvalidUrl {
            name: config.name.clone(),
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self {
            name: config.name.clone(),
            base_url,
            path_rule: config.path_rule.clone(),
        })
    }

    /// `<base>/<mount>/<path>` with this peer's path rule applied.
    pub fn upstream_url(&self, mount: &str, path: &RelativePath) -> Option<Url> {
        let mut segments: Vec<&str> = path.segments().collect();
        if let Some(rule) = &self.path_rule {
            apply_rule(rule, &mut segments);
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(mount.split('/').filter(|s| !s.is_empty()))
            .extend(segments);
        Some(url)
    }
}

fn apply_rule<'a>(rule: &'a PathRule, segments: &mut [&'a str]) {
    match rule {
        PathRule::RenameSegment { from, to } => {
            // Only directory segments are renamed, never the file name.
            let dirs = segments.len().saturating_sub(1);
            if let Some(seg) = segments[..dirs]
                .iter_mut()
                .find(|s| s.eq_ignore_ascii_case(from))
            {
                *seg = to.as_str();
            }
        }
    }
}

/// A successful upstream response, not yet streamed.
#[derive(Debug)]
pub struct RelayedFile {
    pub peer: String,
    pub content_type: Option<HeaderValue>,
    pub response: reqwest::Response,
}

/// Ordered chain of peers.
#[derive(Debug, Clone)]
pub struct PeerRelay {
    client: reqwest::Client,
    peers: Vec<Peer>,
    identity: HeaderValue,
    mount: String,
    timeout: Duration,
}

impl PeerRelay {
    pub fn new(config: &RelayConfig, mount: &str) -> Result<Self, RelayBuildError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .no_proxy()
            .build()?;
        Self::with_client(client, config, mount)
    }

    pub fn with_client(
        client: reqwest::Client,
        config: &RelayConfig,
        mount: &str,
    ) -> Result<Self, RelayBuildError> {
        let peers = config
            .peers
            .iter()
            .map(Peer::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        let identity = HeaderValue::from_str(&config.identity)
            .map_err(|_| RelayBuildError::InvalidIdentity(config.identity.clone()))?;

        Ok(Self {
            client,
            peers,
            identity,
            mount: mount.trim_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Try each peer in order; the first 200 wins.
    pub async fn fetch(&self, path: &RelativePath) -> Option<RelayedFile> {
        for peer in &self.peers {
            let start = Instant::now();
            match self.attempt(peer, path).await {
                Ok(found) => {
                    metrics::record_relay_attempt(&peer.name, "hit", start);
                    tracing::info!(peer = %peer.name, path = %path, "Asset relayed from peer");
                    return Some(found);
                }
                Err(miss) => {
                    metrics::record_relay_attempt(&peer.name, miss.label(), start);
                    tracing::warn!(peer = %peer.name, path = %path, reason = %miss, "Peer miss");
                }
            }
        }
        None
    }

    async fn attempt(&self, peer: &Peer, path: &RelativePath) -> Result<RelayedFile, RelayMiss> {
        let url = peer
            .upstream_url(&self.mount, path)
            .ok_or_else(|| RelayMiss::InvalidUrl(peer.base_url.to_string()))?;

        let request = self
            .client
            .get(url)
            .header(X_PROXY_FROM, self.identity.clone())
            .send();

        let response = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| RelayMiss::Timeout(self.timeout))??;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RelayMiss::Status(status));
        }

        Ok(RelayedFile {
            peer: peer.name.clone(),
            content_type: response.headers().get(CONTENT_TYPE).cloned(),
            response,
        })
    }
}
