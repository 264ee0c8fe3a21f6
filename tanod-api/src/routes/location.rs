//! Location report and snapshot endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::metrics::{self, ReportResult};
use crate::state::AppState;
use tanod_core::{TrackedOfficer, TrackingError};
use tanod_db::validation::coordinates_from_json;

/// Report the calling officer's position
pub async fn report_location(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<TrackedOfficer>> {
    let officer_id = &caller.identity().officer_id;

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            metrics::record_location_report(ReportResult::Rejected);
            debug!(officer_id = %officer_id, error = %rejection, "Unreadable location report");
            return Err(ApiError::from(rejection));
        }
    };

    let result = match coordinates_from_json(&body) {
        Ok(point) => {
            state
                .registry
                .report_location(officer_id, point.latitude, point.longitude)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(tracked) => {
            metrics::record_location_report(ReportResult::Accepted);
            Ok(Json(tracked))
        }
        Err(e) => {
            let outcome = match e {
                TrackingError::Validation(_) | TrackingError::UnknownOfficer(_) => ReportResult::Rejected,
                _ => ReportResult::Failed,
            };
            metrics::record_location_report(outcome);
            debug!(officer_id = %officer_id, error = %e, "Location report refused");
            Err(ApiError::from(e))
        }
    }
}

/// Snapshot of every active officer
pub async fn list_active(State(state): State<AppState>) -> ApiResult<Json<Vec<TrackedOfficer>>> {
    Ok(Json(state.registry.list_active().await?))
}
