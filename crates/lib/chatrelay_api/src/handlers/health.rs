//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Wire shape for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `GET /health` — always healthy; upstream availability is not probed.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
