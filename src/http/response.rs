//! Response building.
//!
//! # Responsibilities
//! - Stream local files and relayed bodies without buffering
//! - Attach content type and `Access-Control-Allow-Origin: *` to assets
//! - Map exhausted searches and faults to JSON error bodies
//!
//! # Design Decisions
//! - No partial responses: headers are only written once a source is chosen
//! - Fault details stay in the logs; clients see a generic 500

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::resolver::{LocalFile, RelayedFile, Resolution, ResolveError};

pub const FILE_NOT_FOUND: &str = "File not found";
pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// JSON body for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
}

/// 404 with `{"success":false,"message":...,"path":...}`.
pub fn not_found(message: &str, path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            message,
            path: Some(path),
        }),
    )
        .into_response()
}

/// A resolution paired with the request path it answers.
pub struct AssetResponse<'a> {
    pub resolution: Resolution,
    pub request_path: &'a str,
}

impl IntoResponse for AssetResponse<'_> {
    fn into_response(self) -> Response {
        match self.resolution {
            Resolution::Local(file) => local_file(file),
            Resolution::Relayed(relayed) => relayed_file(relayed),
            Resolution::NotFound => not_found(FILE_NOT_FOUND, self.request_path),
        }
    }
}

pub fn local_file(found: LocalFile) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CONTENT_LENGTH, found.len);
    if let Some(content_type) = found.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(found.file)))
        .unwrap_or_else(|e| internal_error(&e.to_string()))
}

pub fn relayed_file(relayed: RelayedFile) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    if let Some(content_type) = relayed.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from_stream(relayed.response.bytes_stream()))
        .unwrap_or_else(|e| internal_error(&e.to_string()))
}

/// Local fault surfaced as a server error.
#[derive(Debug)]
pub struct ApiError(pub ResolveError);

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        internal_error(&self.0.to_string())
    }
}

fn internal_error(detail: &str) -> Response {
    tracing::error!(error = %detail, "Request failed");
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            success: false,
            message: "Internal server error",
            path: None,
        }),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
