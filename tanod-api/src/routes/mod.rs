//! API route handlers

pub mod health;
pub mod location;
pub mod schedule;
pub mod session;
pub mod tracking;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::live_check))
        .route("/health/ready", get(health::ready_check))
        .route("/metrics", get(health::metrics))
        // Location endpoints
        .route("/api/v1/locations", post(location::report_location))
        .route("/api/v1/locations/active", get(location::list_active))
        .route("/api/v1/tracking", get(tracking::tracking_socket))
        // Session endpoints
        .route("/api/v1/session/login", post(session::login))
        .route("/api/v1/session/logout", post(session::logout))
        // Scheduling collaborator endpoints
        .route(
            "/api/v1/schedules/:schedule_id",
            put(schedule::upsert_schedule).delete(schedule::delete_schedule),
        )
        .route(
            "/api/v1/schedules/:schedule_id/start-patrol",
            post(schedule::start_patrol),
        )
        .route(
            "/api/v1/schedules/:schedule_id/end-patrol",
            post(schedule::end_patrol),
        )
        .route("/api/v1/patrol-areas/:area_id", put(schedule::upsert_patrol_area))
        .route("/api/v1/officers/:officer_id", put(schedule::upsert_officer))
        // State
        .with_state(state)
}
