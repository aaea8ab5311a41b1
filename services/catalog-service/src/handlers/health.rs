use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::metrics;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

fn health(status: &str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: status.to_string(),
        service: "catalog-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check endpoint. Unhealthy when either store does not answer.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ctx = state.request_context();
    match state.service.ping(&ctx).await {
        Ok(()) => (StatusCode::OK, health("healthy")),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, health("unhealthy")),
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(metrics) => (StatusCode::OK, metrics),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, String::from("Failed to gather metrics"))
        }
    }
}
