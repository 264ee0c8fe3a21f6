//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::dto::HealthResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let active_officers = state.registry.list_active().await.map(|l| l.len()).unwrap_or(0);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        active_officers,
        viewers: state.fanout.subscriber_count().await,
    }))
}

/// Liveness check
pub async fn live_check() -> StatusCode {
    StatusCode::OK
}

/// Readiness check (location store reachable and fan-out hub running)
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_ok = state.stores.health_check().await;
    let hub_ok = state.fanout.is_running();

    let (status, label) = if store_ok && hub_ok {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: state.version.clone(),
            active_officers: 0,
            viewers: state.fanout.subscriber_count().await,
        }),
    )
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
