//! Store and collaborator interfaces
//!
//! `LocationStore` is the single shared mutable resource of the tracking core
//! and is written only by the registry service. `ScheduleSource` and
//! `OfficerDirectory` are read-only views of collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TrackingResult;
use crate::types::{
    OfficerId, OfficerLocation, OfficerProfile, PatrolArea, PatrolAreaId, Schedule, ScheduleId,
};

/// Durable per-officer location records
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Get the record for an officer
    async fn get(&self, officer_id: &OfficerId) -> TrackingResult<Option<OfficerLocation>>;

    /// Insert or replace the record, stamping a new revision.
    ///
    /// Returns the record as stored.
    async fn upsert(&self, location: OfficerLocation) -> TrackingResult<OfficerLocation>;

    /// All records with `is_active == true`
    async fn list_active(&self) -> TrackingResult<Vec<OfficerLocation>>;

    /// Active records whose `last_update` is strictly before `cutoff`
    async fn list_stale(&self, cutoff: DateTime<Utc>) -> TrackingResult<Vec<OfficerLocation>>;

    /// Records whose `current_schedule_id` equals the given schedule
    async fn list_by_schedule(&self, schedule_id: &ScheduleId)
        -> TrackingResult<Vec<OfficerLocation>>;
}

/// Read access to the scheduling subsystem
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Schedules containing the officer whose end time is after `now`
    async fn schedules_for_officer(
        &self,
        officer_id: &OfficerId,
        now: DateTime<Utc>,
    ) -> TrackingResult<Vec<Schedule>>;

    /// Get a schedule by id
    async fn get_schedule(&self, schedule_id: &ScheduleId) -> TrackingResult<Option<Schedule>>;

    /// Schedules referencing a patrol area
    async fn schedules_for_area(&self, area_id: &PatrolAreaId) -> TrackingResult<Vec<Schedule>>;

    /// Get a patrol area by id
    async fn get_patrol_area(&self, area_id: &PatrolAreaId) -> TrackingResult<Option<PatrolArea>>;
}

/// Officer identity and display fields
#[async_trait]
pub trait OfficerDirectory: Send + Sync {
    async fn get_profile(&self, officer_id: &OfficerId) -> TrackingResult<Option<OfficerProfile>>;
}
