//! HTTP API gateway for Warband.
//!
//! Serves the roster REST API, a health check, and the embedded
//! dashboard frontend.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

use warband_config::{AppConfig, GatewayConfig};

pub use api::{ApiState, SharedApiState};

/// Build the Axum router with the health check and the roster API.
pub fn build_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Build the full router including the embedded frontend.
///
/// Layers applied:
/// - CORS restricted to the configured origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_full_router(
    state: SharedApiState,
    gateway: &GatewayConfig,
) -> Result<Router, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(&gateway.allowed_origin())?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Ok(Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http()))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = warband_store::open(&config).await?;
    warband_store::seed_default_week(store.as_ref(), config.season.default_week).await?;
    let state = Arc::new(ApiState::new(store));
    let app = build_full_router(state, &config.gateway)?;

    info!(addr = %addr, backend = %config.store.backend, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use warband_store::InMemoryStore;

    fn test_state() -> SharedApiState {
        Arc::new(ApiState::new(Arc::new(InMemoryStore::new())))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_only() {
        let gateway = GatewayConfig {
            cors_origin: Some("http://localhost:3000".into()),
            ..GatewayConfig::default()
        };
        let app = build_full_router(test_state(), &gateway).unwrap();

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let allowed = response.headers().get("access-control-allow-origin").unwrap();
        assert_eq!(allowed, "http://localhost:3000");
        assert_ne!(allowed, "http://evil.example");
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let app = build_full_router(test_state(), &GatewayConfig::default()).unwrap();
        let big = format!("{{\"name\": \"{}\"}}", "x".repeat(2 * 1024 * 1024));

        let req = Request::builder()
            .method("POST")
            .uri("/api/characters")
            .header("content-type", "application/json")
            .body(Body::from(big))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn invalid_cors_origin_is_an_error() {
        let gateway = GatewayConfig {
            cors_origin: Some("bad\norigin".into()),
            ..GatewayConfig::default()
        };
        assert!(build_full_router(test_state(), &gateway).is_err());
    }
}
