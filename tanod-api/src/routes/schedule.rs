//! Scheduling collaborator endpoints
//!
//! Every mutation of schedules or patrol areas lands here and immediately
//! triggers reconciliation, so marker colors follow patrol starts, ends and
//! reassignments without waiting for the next location report.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;

use crate::auth::Caller;
use crate::dto::{
    EndPatrolRequest, OfficerProfileRequest, PatrolAreaRequest, ReconcileResponse,
    ScheduleRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use tanod_core::{OfficerId, OfficerProfile, PatrolAreaId, PatrolState, ScheduleId};

/// Insert or replace a schedule
pub async fn upsert_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    request: Result<Json<ScheduleRequest>, JsonRejection>,
) -> ApiResult<Json<ReconcileResponse>> {
    let Json(request) = request?;
    if request.end_time <= request.start_time {
        return Err(ApiError::Validation(
            "endTime must be after startTime".to_string(),
        ));
    }

    let schedule_id = ScheduleId::new(schedule_id);
    state
        .stores
        .schedules
        .upsert_schedule(request.into_schedule(schedule_id.clone()))
        .await;
    info!(schedule_id = %schedule_id, "Schedule upserted");

    reconcile(&state, &schedule_id).await
}

/// Remove a schedule; officers patrolling it revert to neutral
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> ApiResult<Json<ReconcileResponse>> {
    let schedule_id = ScheduleId::new(schedule_id);
    if state
        .stores
        .schedules
        .remove_schedule(&schedule_id)
        .await
        .is_none()
    {
        return Err(ApiError::NotFound(format!("schedule {}", schedule_id)));
    }
    info!(schedule_id = %schedule_id, "Schedule removed");

    reconcile(&state, &schedule_id).await
}

/// The calling officer starts their patrol on a schedule
pub async fn start_patrol(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    caller: Caller,
) -> ApiResult<Json<ReconcileResponse>> {
    let schedule_id = ScheduleId::new(schedule_id);
    let officer_id = &caller.identity().officer_id;

    state
        .stores
        .schedules
        .set_patrol_state(&schedule_id, officer_id, PatrolState::Started, Utc::now())
        .await?;
    info!(schedule_id = %schedule_id, officer_id = %officer_id, "Patrol started");

    reconcile(&state, &schedule_id).await
}

/// The calling officer ends their patrol on a schedule.
///
/// With `stopTracking` the officer's marker is also removed.
pub async fn end_patrol(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    caller: Caller,
    request: Option<Json<EndPatrolRequest>>,
) -> ApiResult<Json<ReconcileResponse>> {
    let schedule_id = ScheduleId::new(schedule_id);
    let officer_id = &caller.identity().officer_id;
    let request = request.map(|Json(r)| r).unwrap_or_default();

    state
        .stores
        .schedules
        .set_patrol_state(&schedule_id, officer_id, PatrolState::Completed, Utc::now())
        .await?;
    info!(schedule_id = %schedule_id, officer_id = %officer_id, "Patrol ended");

    let response = reconcile(&state, &schedule_id).await?;
    if request.stop_tracking {
        state.registry.deactivate(officer_id).await?;
    }
    Ok(response)
}

/// Insert or replace a patrol area and recolor officers patrolling it
pub async fn upsert_patrol_area(
    State(state): State<AppState>,
    Path(area_id): Path<String>,
    request: Result<Json<PatrolAreaRequest>, JsonRejection>,
) -> ApiResult<Json<ReconcileResponse>> {
    let Json(request) = request?;
    if request.color.trim().is_empty() {
        return Err(ApiError::Validation("color is required".to_string()));
    }

    let area_id = PatrolAreaId::new(area_id);
    state
        .stores
        .schedules
        .upsert_patrol_area(request.into_area(area_id.clone()))
        .await;

    let updated_officers = state.registry.on_patrol_area_change(&area_id).await?;
    Ok(Json(ReconcileResponse { updated_officers }))
}

/// Insert or replace an officer's directory profile
pub async fn upsert_officer(
    State(state): State<AppState>,
    Path(officer_id): Path<String>,
    request: Result<Json<OfficerProfileRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = request?;
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let profile = OfficerProfile {
        officer_id: OfficerId::new(officer_id),
        name: request.name,
        picture: request.picture,
    };
    let created = state.stores.officers.upsert_profile(profile).await.is_none();

    Ok(if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    })
}

async fn reconcile(state: &AppState, schedule_id: &ScheduleId) -> ApiResult<Json<ReconcileResponse>> {
    let updated_officers = state.registry.on_patrol_status_change(schedule_id).await?;
    Ok(Json(ReconcileResponse { updated_officers }))
}
