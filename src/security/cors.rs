//! CORS origin allow-list and preflight handling.
//!
//! The gateway never blocks on origin; it only decides whether to echo the
//! origin back. Enforcement is left to the browser.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};

pub const ALLOWED_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
     Authorization, Accept, Origin, Cache-Control, X-Requested-With, client-type";

pub const ALLOWED_METHODS: &str = "POST, OPTIONS, GET, PUT, DELETE, PATCH";

/// Parsed origin allow-list.
#[derive(Debug, Clone, Default)]
pub struct CorsGate {
    allowed: Vec<String>,
}

impl CorsGate {
    /// Build from a comma-separated list; entries are trimmed, empty entries dropped.
    pub fn new(allowed_origins: &str) -> Self {
        Self {
            allowed: allowed_origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether `origin` exactly matches an allow-list entry.
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed.iter().any(|o| o == origin)
    }

    /// Write the CORS response headers for a request carrying `origin`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(origin) = origin {
            if origin.to_str().is_ok_and(|o| self.allows(o)) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            }
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
    }
}

/// Answer preflights with 204 and decorate every other response.
pub async fn cors_middleware(
    State(gate): State<Arc<CorsGate>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = if request.method() == Method::OPTIONS {
        let mut preflight = Response::new(Body::empty());
        *preflight.status_mut() = StatusCode::NO_CONTENT;
        preflight
    } else {
        next.run(request).await
    };

    gate.apply(origin.as_ref(), response.headers_mut());
    response
}
