//! API module
//!
//! Contains the HTTP request handlers and the router that wires them to the
//! shared review store.

pub mod reviews;
pub mod wards;

use crate::store::SharedStore;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Plain-text body of `GET /`
pub const GREETING: &str = "Ward Reviews API connected to database";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"unhealthy"`
    pub status: String,
    /// Crate version
    pub version: String,
    /// `"ok"` or the database error message
    pub database: String,
}

/// Build the application router around a store handle
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/wards", get(wards::list_wards))
        .route("/api/reviews", post(reviews::submit_review))
        .route("/api/reviews/:ward_id", get(reviews::list_reviews))
        // Middleware (order matters - request_id should be first)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// GET / - Plain-text greeting
pub async fn root() -> &'static str {
    GREETING
}

/// GET /api/health - Report whether the database answers
pub async fn health_check(
    State(store): State<SharedStore>,
) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION").to_string();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                version,
                database: "ok".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    version,
                    database: e.to_string(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_root_greeting() {
        assert_eq!(root().await, GREETING);
    }

    #[tokio::test]
    async fn test_health_check_healthy() {
        let store: SharedStore = Arc::new(InMemoryStore::new());
        let (status, Json(body)) = health_check(State(store)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "ok");
    }

    #[tokio::test]
    async fn test_health_check_database_down() {
        let memory = Arc::new(InMemoryStore::new());
        memory.set_offline(true);
        let (status, Json(body)) = health_check(State(memory as SharedStore)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "unhealthy");
        assert_ne!(body.database, "ok");
    }
}
