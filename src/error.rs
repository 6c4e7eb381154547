//! Gateway error taxonomy and its HTTP mapping.
//!
//! Every hard failure leaves the gateway as `{"error": "<message>"}`. Transport
//! failures only ever expose a generic message; upstream rejections relay the
//! dependency's status and body unchanged.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::security::token::TokenError;

/// Downstream dependency a call was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Identity,
    Storage,
}

impl std::fmt::Display for Upstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Upstream::Identity => f.write_str("identity service"),
            Upstream::Storage => f.write_str("storage service"),
        }
    }
}

/// Errors surfaced by the gateway's core operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required request header was absent or empty.
    #[error("Missing {0} header")]
    MissingHeader(&'static str),

    /// The bearer value or token structure could not be read.
    #[error("Malformed token: {0}")]
    MalformedToken(TokenError),

    /// The token decoded but lacks the identifier claim.
    #[error("Invalid token: {0}")]
    ClaimMissing(TokenError),

    /// The identifier claim is present but has the wrong type or format.
    #[error("Invalid token: {0}")]
    ClaimInvalid(TokenError),

    /// The dependency could not be reached (DNS, refused, timeout).
    #[error("{upstream} unreachable: {source}")]
    TransportFailure {
        upstream: Upstream,
        #[source]
        source: reqwest::Error,
    },

    /// The dependency answered with a non-200 status.
    #[error("{upstream} rejected the request with {status}: {body}")]
    UpstreamRejected {
        upstream: Upstream,
        status: StatusCode,
        body: String,
    },

    /// The dependency answered 200 with a body of the wrong shape.
    #[error("{upstream} returned an undecodable response: {reason}")]
    DecodeFailure { upstream: Upstream, reason: String },

    /// The uploaded file is neither an image nor a document.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The request is well-formed but violates an endpoint rule.
    #[error("{0}")]
    ValidationFailure(String),

    /// The request could not be extracted (query string, JSON or multipart body).
    #[error("{message}")]
    RequestRejected { status: StatusCode, message: String },
}

impl GatewayError {
    /// HTTP status the error maps to at the gateway boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingHeader(_)
            | GatewayError::MalformedToken(_)
            | GatewayError::ClaimMissing(_)
            | GatewayError::ClaimInvalid(_) => StatusCode::UNAUTHORIZED,
            GatewayError::TransportFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamRejected { status, .. } => *status,
            GatewayError::DecodeFailure { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GatewayError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            GatewayError::RequestRejected { status, .. } => *status,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::TransportFailure {
                upstream: Upstream::Identity,
                ..
            } => "Failed to validate session".to_string(),
            GatewayError::TransportFailure {
                upstream: Upstream::Storage,
                ..
            } => "Failed to reach file storage".to_string(),
            GatewayError::UpstreamRejected { body, .. } => body.clone(),
            GatewayError::DecodeFailure { upstream, .. } => {
                format!("Unexpected response from {upstream}")
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn transport(upstream: Upstream) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| GatewayError::TransportFailure { upstream, source }
    }
}

impl From<TokenError> for GatewayError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ClaimMissing(_) => GatewayError::ClaimMissing(err),
            TokenError::ClaimNotString(_) | TokenError::ClaimFormat { .. } => {
                GatewayError::ClaimInvalid(err)
            }
            _ => GatewayError::MalformedToken(err),
        }
    }
}

macro_rules! from_rejection {
    ($($rejection:ty),* $(,)?) => {
        $(
            impl From<$rejection> for GatewayError {
                fn from(rejection: $rejection) -> Self {
                    GatewayError::RequestRejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )*
    };
}

from_rejection!(QueryRejection, JsonRejection, MultipartRejection, MultipartError);

/// Turn a non-200 upstream response into [`GatewayError::UpstreamRejected`].
///
/// The upstream body is relayed as-is; if it cannot be read the rejection
/// still carries the status, with an empty body.
pub(crate) async fn upstream_rejection(
    upstream: Upstream,
    response: reqwest::Response,
) -> GatewayError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(%upstream, %status, error = %e, "Could not read rejection body");
            String::new()
        }
    };
    GatewayError::UpstreamRejected {
        upstream,
        status,
        body,
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = %status, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
