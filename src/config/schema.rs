//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, inbound body limit).
    pub listener: ListenerConfig,

    /// Identity service used to validate sessions.
    pub identity: IdentityConfig,

    /// File storage service and its per-operation endpoints.
    pub storage: StorageConfig,

    /// Session validation policy.
    pub session: SessionConfig,

    /// Allowed CORS origins.
    pub cors: CorsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound body size in bytes. Uploads are buffered in memory.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Identity service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL; `/api/v1/ValidateJWT` is appended for session checks.
    pub base_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
        }
    }
}

/// Storage service configuration.
///
/// Endpoint fields are suffixes joined onto `base_url`, which must end with `/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_url: String,
    pub images: String,
    pub private_images: String,
    pub documents: String,
    pub files: String,
    pub delete: String,
    pub from_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8082/".to_string(),
            images: "api/v1/SaveImages".to_string(),
            private_images: "api/v1/SavePrivateImages".to_string(),
            documents: "api/v1/SaveDocuments".to_string(),
            files: "api/v1/SaveFiles".to_string(),
            delete: "api/v1/deleteFile".to_string(),
            from_url: "ImagesFromUrl".to_string(),
        }
    }
}

/// Session validation policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path that skips validation entirely (exact match after normalization).
    pub public_path: Option<String>,

    /// Require a `Client-Type` header in addition to `Authorization`.
    pub require_client_type: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            public_path: Some("/".to_string()),
            require_client_type: true,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins.
    pub allowed_origins: String,
}

/// Timeout configuration for inbound requests and outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for a single outbound call in seconds.
    pub outbound_secs: u64,

    /// Total time allowed for an inbound request in seconds.
    pub inbound_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            outbound_secs: 30,
            inbound_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
