//! HTTP adapters - REST API implementations.
//!
//! Routes:
//! - `GET /health`
//! - `/api/payments/*` (authenticated)

pub mod health;
pub mod middleware;
pub mod payments;

pub use payments::{payments_routes, PaymentsAppState};

use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use middleware::{auth_middleware, AuthState};

/// Builds the full application router.
///
/// The auth middleware only wraps `/api/payments`; `/health` stays public.
/// Every response carries an `x-request-id`, generated when the caller
/// did not send one.
pub fn app_router(payments: PaymentsAppState, auth: AuthState, server: &ServerConfig) -> Router {
    let api = payments_routes()
        .route_layer(from_fn_with_state(auth, auth_middleware))
        .with_state(payments);

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/payments", api)
        .fallback(route_not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(allowed)
}

