//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

use crate::domain::foundation::Timestamp;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Timestamp::now().to_rfc3339(),
    })
}
