//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Peer URLs parse and use http(s)
//! - Peer names are unique and never equal our own identity
//! - Value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{AppConfig, PathRule};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("relay.identity must not be empty")]
    EmptyIdentity,

    #[error("storage.{0} must not be empty")]
    EmptyMount(&'static str),

    #[error("storage.mount and storage.legacy_mount are both {0}")]
    MountConflict(String),

    #[error("relay.timeout_secs must be greater than zero")]
    ZeroRelayTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("timeouts.request_secs ({request_secs}) must exceed the relay chain budget ({chain_secs}s)")]
    RequestTimeoutBelowRelayChain { request_secs: u64, chain_secs: u64 },

    #[error("peer {name}: invalid base_url {url}")]
    InvalidPeerUrl { name: String, url: String },

    #[error("peer {0}: duplicate name")]
    DuplicatePeer(String),

    #[error("peer {0}: name equals relay.identity")]
    PeerIsSelf(String),

    #[error("peer {0}: path_rule must name both segments")]
    EmptyPathRule(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.relay.identity.trim().is_empty() {
        errors.push(ValidationError::EmptyIdentity);
    }
    if config.storage.mount.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyMount("mount"));
    }
    if config.storage.legacy_mount.trim_matches('/').is_empty() {
        errors.push(ValidationError::EmptyMount("legacy_mount"));
    }
    let mount = config.storage.mount.trim_matches('/');
    if !mount.is_empty() && mount == config.storage.legacy_mount.trim_matches('/') {
        errors.push(ValidationError::MountConflict(mount.to_string()));
    }
    if config.relay.timeout_secs == 0 {
        errors.push(ValidationError::ZeroRelayTimeout);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    // Callers must see the chain's 404, never a request timeout.
    let chain_secs = config
        .relay
        .timeout_secs
        .saturating_mul(config.relay.peers.len() as u64);
    if config.timeouts.request_secs > 0 && chain_secs >= config.timeouts.request_secs {
        errors.push(ValidationError::RequestTimeoutBelowRelayChain {
            request_secs: config.timeouts.request_secs,
            chain_secs,
        });
    }

    let mut seen = HashSet::new();
    for peer in &config.relay.peers {
        let valid_url = url::Url::parse(&peer.base_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
            .unwrap_or(false);
        if !valid_url {
            errors.push(ValidationError::InvalidPeerUrl {
                name: peer.name.clone(),
                url: peer.base_url.clone(),
            });
        }
        if !seen.insert(peer.name.as_str()) {
            errors.push(ValidationError::DuplicatePeer(peer.name.clone()));
        }
        if peer.name == config.relay.identity {
            errors.push(ValidationError::PeerIsSelf(peer.name.clone()));
        }
        if let Some(PathRule::RenameSegment { from, to }) = &peer.path_rule {
            if from.is_empty() || to.is_empty() {
                errors.push(ValidationError::EmptyPathRule(peer.name.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
