//! API Data Transfer Objects
//!
//! Location reports are read as untyped JSON so missing and non-numeric
//! coordinates can be rejected with a precise validation error; see
//! `tanod_db::validation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tanod_core::{
    OfficerId, PatrolArea, PatrolAreaId, PatrolStatus, Schedule, ScheduleId, ScheduleStatus,
};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_officers: usize,
    pub viewers: usize,
}

/// Schedule upsert body; the id comes from the path
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(default)]
    pub tanods: Vec<OfficerId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub patrol_area: Option<PatrolAreaId>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub patrol_status: Vec<PatrolStatus>,
}

impl ScheduleRequest {
    pub fn into_schedule(self, id: ScheduleId) -> Schedule {
        Schedule {
            id,
            tanods: self.tanods,
            start_time: self.start_time,
            end_time: self.end_time,
            patrol_area: self.patrol_area,
            status: self.status,
            patrol_status: self.patrol_status,
        }
    }
}

/// Patrol area upsert body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolAreaRequest {
    pub color: String,
    #[serde(default)]
    pub legend: String,
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl PatrolAreaRequest {
    pub fn into_area(self, id: PatrolAreaId) -> PatrolArea {
        PatrolArea {
            id,
            color: self.color,
            legend: self.legend,
            coordinates: self.coordinates,
        }
    }
}

/// Officer profile upsert body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerProfileRequest {
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// End-patrol body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndPatrolRequest {
    /// Also deactivate the officer's marker
    #[serde(default)]
    pub stop_tracking: bool,
}

/// Result of a schedule or patrol-area change
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// Officers whose marker fields changed
    pub updated_officers: Vec<OfficerId>,
}

/// Result of a session call
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub officer_id: OfficerId,
    pub is_active: bool,
}
