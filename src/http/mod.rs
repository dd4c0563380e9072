//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned and echoed)
//!     → cors.rs (origin policy)
//!     → handlers.rs (asset, legacy uploads, index, health, fallback)
//!     → resolver (local layouts → peer relay)
//!     → response.rs (stream body, headers, JSON errors)
//!     → Send to client
//! ```

pub mod cors;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
