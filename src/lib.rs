//! Asset relay library: serves stored assets from local legacy layouts and
//! relays misses to sibling services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resolver;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolver::{FileResolver, HopContext, RelativePath, Resolution};
