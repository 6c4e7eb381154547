//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use edge_relay::config::GatewayConfig;
use edge_relay::http::HttpServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use wiremock::MockServer;

pub const USER_ID: &str = "65a1f0c2b4e8d91a2c3b4d5e";
pub const BOUNDARY: &str = "relay-test-boundary";

/// First bytes of a JFIF JPEG.
pub const JPEG_BYTES: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00,
];

/// Config pointing both upstreams at mock servers.
pub fn config_for(identity: &MockServer, storage: &MockServer) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.identity.base_url = identity.uri();
    config.storage.base_url = format!("{}/", storage.uri());
    config.timeouts.outbound_secs = 5;
    config.cors.allowed_origins = "https://app.example.com".to_string();
    config
}

pub fn router(config: GatewayConfig) -> Router {
    HttpServer::new(config).unwrap().router()
}

/// A token carrying `_id`, signed with a key the gateway never sees.
pub fn token(user_id: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "_id": user_id, "exp": 4_102_444_800u64 }),
        &EncodingKey::from_secret(b"not-the-identity-service-key"),
    )
    .unwrap()
}

/// A request carrying a full set of session headers.
pub fn authed(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token(USER_ID)))
        .header("client-type", "web")
        .header("x-csrf-token", "csrf-1")
        .header(header::COOKIE, "session=abc")
}

/// One field of a multipart body.
pub enum Field<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

pub fn multipart_body(fields: &[Field<'_>]) -> Body {
    let mut body = Vec::new();
    for field in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match field {
            Field::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Field::File(filename, content) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
