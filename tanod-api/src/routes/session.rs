//! Session lifecycle endpoints

use axum::{extract::State, Json};

use crate::auth::Caller;
use crate::dto::SessionResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Officer authenticated: make sure their record exists
pub async fn login(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<SessionResponse>> {
    let record = state
        .registry
        .open_session(&caller.identity().officer_id)
        .await?;

    Ok(Json(SessionResponse {
        officer_id: record.officer_id,
        is_active: record.is_active,
    }))
}

/// Officer logged out: remove their marker
pub async fn logout(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<SessionResponse>> {
    let officer_id = caller.identity().officer_id.clone();
    state.registry.deactivate(&officer_id).await?;

    Ok(Json(SessionResponse {
        officer_id,
        is_active: false,
    }))
}
