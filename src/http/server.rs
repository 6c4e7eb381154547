//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared outbound client and the gateway components from config
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, CORS, session)
//! - Give layer-generated failures the JSON error body
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::files::{StorageEndpoints, UploadProxy};
use crate::http::handlers::{self, AppState};
use crate::http::request::{request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::ensure_error_body;
use crate::resilience::outbound_client;
use crate::security::{
    cors::cors_middleware, session::session_middleware, CorsGate, IdentityClient,
    SessionValidator,
};

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build outbound HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid storage endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        // One client for both upstreams so connections are pooled
        let client = outbound_client(&config.timeouts)?;
        let endpoints = Arc::new(StorageEndpoints::from_config(&config.storage)?);

        let session = SessionValidator::new(
            IdentityClient::new(client.clone(), &config.identity),
            &config.session,
        );
        let cors = Arc::new(CorsGate::new(&config.cors.allowed_origins));
        let state = AppState {
            uploads: UploadProxy::new(client),
            endpoints,
        };

        let router = Self::build_router(&config, state, session, cors);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID, trace, error body, timeout, body limit, CORS,
    /// session.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        session: SessionValidator,
        cors: Arc<CorsGate>,
    ) -> Router {
        Router::new()
            .route("/", get(handlers::health))
            .route("/api/v1/me", get(handlers::current_user))
            .route(
                "/api/v1/files/{bucket}",
                post(handlers::upload).put(handlers::update),
            )
            .route("/api/v1/files", delete(handlers::delete))
            .route("/api/v1/images/from-url", post(handlers::save_from_url))
            .with_state(state)
            .layer(middleware::from_fn_with_state(session, session_middleware))
            .layer(middleware::from_fn_with_state(cors, cors_middleware))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.inbound_secs,
            )))
            .layer(middleware::map_response(ensure_error_body))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request),
                    )
                }),
            )
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            identity = %self.config.identity.base_url,
            storage = %self.config.storage.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
