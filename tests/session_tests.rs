//! Session gate behaviour through the full middleware stack.

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use edge_relay::http::HttpServer;
use edge_relay::lifecycle::Shutdown;
use serde_json::json;
use tower::ServiceExt;
use wiremock::{
    matchers::{header as has_header, method, path},
    Mock, MockServer, ResponseTemplate,
};

mod common;
use common::{authed, body_json, config_for, router, USER_ID};

async fn mock_servers() -> (MockServer, MockServer) {
    (MockServer::start().await, MockServer::start().await)
}

#[tokio::test]
async fn test_public_path_skips_identity_service() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_missing_authorization_rejected_locally() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(
            Request::get("/api/v1/me")
                .header("client-type", "web")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Missing Authorization header" })
    );
}

#[tokio::test]
async fn test_missing_client_type_rejected_locally() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(
            Request::get("/api/v1/me")
                .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Missing Client header" })
    );
}

#[tokio::test]
async fn test_identity_rejection_is_relayed() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ValidateJWT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("session revoked"))
        .expect(1)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(authed(Method::GET, "/api/v1/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({ "error": "session revoked" }));
}

#[tokio::test]
async fn test_valid_session_reaches_handler_with_relayed_headers() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/ValidateJWT"))
        .and(has_header("client-type", "web"))
        .and(has_header("x-csrf-token", "csrf-1"))
        .and(has_header("cookie", "session=abc"))
        .and(has_header("path", "/api/v1/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(authed(Method::GET, "/api/v1/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "user_id": USER_ID }));
}

#[tokio::test]
async fn test_unreachable_identity_service_fails_closed() {
    let (identity, storage) = mock_servers().await;
    let mut config = config_for(&identity, &storage);
    config.identity.base_url = "http://127.0.0.1:1".to_string();

    let response = router(config)
        .oneshot(authed(Method::GET, "/api/v1/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Failed to validate session" })
    );
}

#[tokio::test]
async fn test_preflight_answered_before_session_check() {
    let (identity, storage) = mock_servers().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&identity)
        .await;

    let response = router(config_for(&identity, &storage))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/v1/files/images")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );
}

#[tokio::test]
async fn test_server_drains_on_shutdown() {
    let (identity, storage) = mock_servers().await;
    let server = HttpServer::new(config_for(&identity, &storage)).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
