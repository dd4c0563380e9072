//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{AppConfig, PathRule, PeerConfig, TlsConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Name of the primary file-store peer created from `FILE_STORE_URL`.
pub const FILE_STORE_PEER: &str = "file-store";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the process environment so overrides can be exercised
/// without mutating global state.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(addr) = var("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(port) = var("PORT") {
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidEnv {
            var: "PORT",
            value: port.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let (Some(cert), Some(key)) = (var("TLS_CERT_PATH"), var("TLS_KEY_PATH")) {
        config.listener.tls = Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        });
    }

    if let Some(root) = var("FILES_ROOT") {
        config.storage.search_root = PathBuf::from(root);
    }
    if let Some(dir) = var("LEGACY_UPLOADS_DIR") {
        config.storage.legacy_uploads_dir = Some(PathBuf::from(dir));
    }
    if let Some(mount) = var("FILES_MOUNT") {
        config.storage.mount = mount.trim_matches('/').to_string();
    }

    if let Some(identity) = var("SERVICE_IDENTITY") {
        config.relay.identity = identity;
    }
    if let Some(secs) = var("RELAY_TIMEOUT_SECS") {
        config.relay.timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidEnv {
            var: "RELAY_TIMEOUT_SECS",
            value: secs.clone(),
        })?;
    }

    // The file store always leads the chain; legacy peers follow in listed order.
    if let Some(url) = var("FILE_STORE_URL") {
        config.relay.peers.retain(|p| p.name != FILE_STORE_PEER);
        config.relay.peers.insert(
            0,
            PeerConfig {
                name: FILE_STORE_PEER.to_string(),
                base_url: url,
                path_rule: Some(PathRule::RenameSegment {
                    from: "tickets".to_string(),
                    to: "Tickets".to_string(),
                }),
            },
        );
    }
    if let Some(list) = var("LEGACY_PEERS") {
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, url) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidEnv {
                var: "LEGACY_PEERS",
                value: entry.to_string(),
            })?;
            let name = name.trim().to_string();
            config.relay.peers.retain(|p| p.name != name);
            config.relay.peers.push(PeerConfig {
                name,
                base_url: url.trim().to_string(),
                path_rule: None,
            });
        }
    }
    if let Some(list) = var("KNOWN_PEERS") {
        config.relay.known_peers = split_list(&list);
    }

    if let Some(list) = var("CORS_ORIGINS") {
        let mut origins = split_list(&list);
        origins.dedup();
        config.cors.allowed_origins = origins;
    }

    if let Some(level) = var("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(addr) = var("METRICS_ADDRESS") {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr;
    }

    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
