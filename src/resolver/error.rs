//! Resolver error types.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// A fault that must surface to the caller as a server error.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Filesystem failure other than "does not exist".
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single peer attempt did not produce the file.
///
/// Misses are logged and the chain advances; they never reach the caller.
#[derive(Debug, Error)]
pub enum RelayMiss {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(StatusCode),

    #[error("cannot build upstream url from base {0}")]
    InvalidUrl(String),
}

impl RelayMiss {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RelayMiss::Timeout(_) => "timeout",
            RelayMiss::Unreachable(_) => "unreachable",
            RelayMiss::Status(_) => "status",
            RelayMiss::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Failure constructing the relay from configuration.
#[derive(Debug, Error)]
pub enum RelayBuildError {
    #[error("peer {name}: invalid base url {url}: {source}")]
    InvalidUrl {
        name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("identity {0:?} is not a valid header value")]
    InvalidIdentity(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
