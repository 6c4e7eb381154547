//! Session validation middleware.
//! Delegates every session decision to the identity service.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::{IdentityConfig, SessionConfig};
use crate::error::{upstream_rejection, GatewayError, GatewayResult, Upstream};
use crate::observability::metrics;
use crate::security::headers::RelayedHeaders;

/// Identity service endpoint that validates the relayed session headers.
pub const VALIDATE_JWT_PATH: &str = "/api/v1/ValidateJWT";

/// Label for `Client-Type` in the missing-header error: `Missing Client header`.
pub const CLIENT_HEADER_LABEL: &str = "Client";

/// Client for the identity service's session check.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    validate_url: String,
}

impl IdentityClient {
    pub fn new(client: reqwest::Client, config: &IdentityConfig) -> Self {
        Self {
            client,
            validate_url: format!(
                "{}{}",
                config.base_url.trim_end_matches('/'),
                VALIDATE_JWT_PATH
            ),
        }
    }

    /// Ask the identity service whether the relayed session is valid.
    ///
    /// Exactly one attempt is made; there is no retry on any failure.
    pub async fn validate(&self, headers: &RelayedHeaders) -> GatewayResult<()> {
        let response = self
            .client
            .post(&self.validate_url)
            .headers(headers.to_header_map())
            .send()
            .await
            .map_err(GatewayError::transport(Upstream::Identity))?;

        if response.status() == StatusCode::OK {
            return Ok(());
        }
        Err(upstream_rejection(Upstream::Identity, response).await)
    }
}

/// State for the session middleware.
#[derive(Clone)]
pub struct SessionValidator {
    identity: IdentityClient,
    public_path: Option<String>,
    require_client_type: bool,
}

/// Outcome of one session check.
#[derive(Debug)]
pub enum SessionOutcome {
    Bypassed,
    Passed,
    Rejected(GatewayError),
}

impl SessionOutcome {
    fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Bypassed => "bypassed",
            SessionOutcome::Passed => "passed",
            SessionOutcome::Rejected(GatewayError::UpstreamRejected { .. }) => "rejected_upstream",
            SessionOutcome::Rejected(GatewayError::TransportFailure { .. }) => "transport_failure",
            SessionOutcome::Rejected(_) => "rejected_local",
        }
    }
}

impl SessionValidator {
    pub fn new(identity: IdentityClient, config: &SessionConfig) -> Self {
        Self {
            identity,
            public_path: config.public_path.as_deref().map(|p| normalize_path(p).to_string()),
            require_client_type: config.require_client_type,
        }
    }

    /// Run the check for a request's headers and path.
    pub async fn check(&self, headers: &axum::http::HeaderMap, path: &str) -> SessionOutcome {
        if self
            .public_path
            .as_deref()
            .is_some_and(|public| public == normalize_path(path))
        {
            return SessionOutcome::Bypassed;
        }

        let relayed = RelayedHeaders::extract(headers, path);
        if relayed.authorization().is_empty() {
            return SessionOutcome::Rejected(GatewayError::MissingHeader("Authorization"));
        }
        if self.require_client_type && relayed.client_type().is_empty() {
            return SessionOutcome::Rejected(GatewayError::MissingHeader(CLIENT_HEADER_LABEL));
        }

        match self.identity.validate(&relayed).await {
            Ok(()) => SessionOutcome::Passed,
            Err(e) => SessionOutcome::Rejected(e),
        }
    }
}

/// Trim trailing slashes so `/health/` and `/health` compare equal. Root stays `/`.
fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Gate a request on the identity service's verdict.
///
/// The request passes through untouched on success; nothing learned here is
/// attached to it.
pub async fn session_middleware(
    State(validator): State<SessionValidator>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let path = request.uri().path().to_string();

    let outcome = validator.check(request.headers(), &path).await;
    metrics::record_session_outcome(outcome.label(), start);

    match outcome {
        SessionOutcome::Bypassed | SessionOutcome::Passed => next.run(request).await,
        SessionOutcome::Rejected(e) => {
            tracing::warn!(path = %path, error = %e, "Session rejected");
            e.into_response()
        }
    }
}
