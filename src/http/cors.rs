// CORS middleware
use std::time::Duration;

use axum::http::{header, request::Parts, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::CorsConfig;

/// Build the CORS layer. An empty origin list allows any origin without
/// credentials; a configured list allows credentials.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static("x-client-type"),
        ])
        .max_age(Duration::from_secs(3600));

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let exact: Vec<String> = config
        .allowed_origins
        .iter()
        .map(|o| o.trim_end_matches('/').to_string())
        .collect();
    let suffixes = config.allowed_origin_suffixes.clone();

    layer
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin_allowed(origin, &exact, &suffixes)
        }))
        .allow_credentials(true)
}

/// Exact match after trimming a trailing slash, or a host under one of `suffixes`.
pub fn origin_allowed(origin: &HeaderValue, exact: &[String], suffixes: &[String]) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let normalized = origin.trim_end_matches('/');
    if exact.iter().any(|o| o == normalized) {
        return true;
    }

    let allowed = url::Url::parse(normalized)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| {
            suffixes
                .iter()
                .any(|s| host == *s || host.ends_with(&format!(".{}", s)))
        });
    if !allowed {
        tracing::warn!(origin, "CORS blocked origin");
    }
    allowed
}
