//! TLS configuration and certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::schema::TlsConfig;

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, std::io::Error> {
    if !cert_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Certificate file not found: {:?}", cert_path),
        ));
    }
    if !key_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Private key file not found: {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

/// Load TLS when both files exist; `None` (plain HTTP) otherwise.
pub async fn load_if_present(config: &TlsConfig) -> Result<Option<RustlsConfig>, std::io::Error> {
    if !config.cert_path.exists() || !config.key_path.exists() {
        tracing::warn!(
            cert = %config.cert_path.display(),
            key = %config.key_path.display(),
            "TLS certificates not found, using HTTP instead of HTTPS"
        );
        return Ok(None);
    }
    load_tls_config(&config.cert_path, &config.key_path).await.map(Some)
}
