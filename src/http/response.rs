//! Response shaping for failures produced outside the handlers.
//!
//! The inbound timeout (408) and the body limit (413) answer before any
//! handler runs, with an empty or plain-text body. This layer gives them the
//! same `{"error": ...}` body every other failure carries.

use axum::{
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorBody;

/// Rewrite layer-generated 408/413 responses into JSON error bodies.
pub async fn ensure_error_body(response: Response) -> Response {
    let message = match response.status() {
        StatusCode::REQUEST_TIMEOUT => "Request timed out",
        StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
        _ => return response,
    };
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }

    let (parts, _) = response.into_parts();
    let mut rebuilt = (
        parts.status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response();
    for (name, value) in &parts.headers {
        if !rebuilt.headers().contains_key(name) && *name != CONTENT_LENGTH {
            rebuilt.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rebuilt
}
