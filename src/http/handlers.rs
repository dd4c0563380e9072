use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::request::request_id;
use crate::http::response::{not_found, ApiError, AssetResponse, FILE_NOT_FOUND, ROUTE_NOT_FOUND};
use crate::http::server::AppState;
use crate::resolver::{HopContext, RelativePath, Resolution};

/// `GET /<mount>/{*path}`: local layouts, then the peer chain.
pub async fn serve_asset(
    State(state): State<AppState>,
    Path(path): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let Some(relative) = RelativePath::parse(&path) else {
        return not_found(FILE_NOT_FOUND, uri.path());
    };
    let hop = HopContext::from_headers(&headers);

    tracing::debug!(
        request_id = %request_id(&headers),
        path = %relative,
        origin = hop.origin().unwrap_or("client"),
        "Resolving asset"
    );

    match state.resolver.resolve(&relative, &hop).await {
        Ok(resolution) => AssetResponse {
            resolution,
            request_path: uri.path(),
        }
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// `GET /<legacy mount>/{*path}`: flat uploads, never relayed.
pub async fn serve_legacy_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
    uri: Uri,
) -> Response {
    let Some(relative) = RelativePath::parse(&path) else {
        return not_found(FILE_NOT_FOUND, uri.path());
    };

    let resolution = match state.uploads.find(&relative).await {
        Ok(Some(found)) => Resolution::Local(found),
        Ok(None) => Resolution::NotFound,
        Err(e) => return ApiError::from(e).into_response(),
    };
    AssetResponse {
        resolution,
        request_path: uri.path(),
    }
    .into_response()
}

#[derive(Serialize)]
pub struct ServiceIndex {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Serialize)]
pub struct Endpoints {
    pub health: &'static str,
    pub files: String,
    pub uploads: String,
}

pub async fn index(State(state): State<AppState>) -> Json<ServiceIndex> {
    Json(ServiceIndex {
        success: true,
        message: "Asset relay",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/api/v1/health",
            files: format!("/{}/", state.mount),
            uploads: format!("/{}/", state.legacy_mount),
        },
    })
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

/// Fallback for unmatched routes; asset-looking paths get the file message.
pub async fn fallback(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    let is_file_request = [&state.mount, &state.legacy_mount]
        .iter()
        .any(|mount| path.starts_with(&format!("/{}/", mount)));

    not_found(
        if is_file_request {
            FILE_NOT_FOUND
        } else {
            ROUTE_NOT_FOUND
        },
        path,
    )
}
