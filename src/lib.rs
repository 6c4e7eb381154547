//! Edge relay library: session gate and file proxy in front of the
//! identity and storage services.

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
