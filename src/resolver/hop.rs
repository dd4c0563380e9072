//! Hop context for relay loop prevention.
//!
//! Every relayed request carries `X-Proxy-From: <sender identity>`. A request
//! that arrives with a marker naming one of our peers has already been bounced
//! once and must terminate here.

use std::collections::HashSet;

use axum::http::{HeaderMap, HeaderName};

/// Header naming the service that forwarded a request.
pub const X_PROXY_FROM: HeaderName = HeaderName::from_static("x-proxy-from");

/// Where the current request came from, relay-wise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopContext {
    origin: Option<String>,
}

impl HopContext {
    /// A request straight from a client.
    pub fn direct() -> Self {
        Self::default()
    }

    /// A request forwarded by the named peer.
    pub fn from_peer(name: impl Into<String>) -> Self {
        Self {
            origin: Some(name.into()),
        }
    }

    /// Extract the marker from inbound headers. Non-UTF-8 or blank markers
    /// count as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let origin = headers
            .get(&X_PROXY_FROM)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);
        Self { origin }
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// True when the request was forwarded by one of `known_peers`.
    pub fn is_loop(&self, known_peers: &HashSet<String>) -> bool {
        self.origin
            .as_ref()
            .is_some_and(|origin| known_peers.contains(origin))
    }
}
