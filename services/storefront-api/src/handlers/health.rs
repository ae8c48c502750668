//! Health check handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use skapto_store::KeyValueStore;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub ledger: &'static str,
}

/// Liveness probe - always returns OK if the service is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - checks ledger database connectivity
pub async fn ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok(Json(ReadyResponse {
            status: "ready",
            ledger: "connected",
        })),
        Err(e) => {
            tracing::error!(error = ?e, "Ledger health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
