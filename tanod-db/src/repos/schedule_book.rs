//! In-memory schedule book
//!
//! Stands in for the scheduling subsystem. Schedules are indexed by officer
//! and end time so resolving an officer's active patrol only touches that
//! officer's unexpired schedules, and by patrol area for recolor fan-out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use tanod_core::{
    OfficerId, PatrolArea, PatrolAreaId, PatrolState, PatrolStatus, Schedule, ScheduleId,
    ScheduleSource, TrackingError, TrackingResult,
};

#[derive(Debug, Default)]
struct BookState {
    schedules: HashMap<ScheduleId, Schedule>,
    areas: HashMap<PatrolAreaId, PatrolArea>,
    // officer -> (end_time, schedule) ordered by end time
    by_officer: HashMap<OfficerId, BTreeSet<(DateTime<Utc>, ScheduleId)>>,
    by_area: HashMap<PatrolAreaId, HashSet<ScheduleId>>,
}

impl BookState {
    fn index(&mut self, schedule: &Schedule) {
        for officer in &schedule.tanods {
            self.by_officer
                .entry(officer.clone())
                .or_default()
                .insert((schedule.end_time, schedule.id.clone()));
        }
        if let Some(area) = &schedule.patrol_area {
            self.by_area
                .entry(area.clone())
                .or_default()
                .insert(schedule.id.clone());
        }
    }

    fn unindex(&mut self, schedule: &Schedule) {
        for officer in &schedule.tanods {
            if let Some(entries) = self.by_officer.get_mut(officer) {
                entries.remove(&(schedule.end_time, schedule.id.clone()));
                if entries.is_empty() {
                    self.by_officer.remove(officer);
                }
            }
        }
        if let Some(area) = &schedule.patrol_area {
            if let Some(ids) = self.by_area.get_mut(area) {
                ids.remove(&schedule.id);
                if ids.is_empty() {
                    self.by_area.remove(area);
                }
            }
        }
    }
}

/// In-memory `ScheduleSource` with the mutations the scheduling subsystem performs
#[derive(Debug, Default, Clone)]
pub struct ScheduleBook {
    state: Arc<RwLock<BookState>>,
}

impl ScheduleBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a schedule. Returns the previous version.
    ///
    /// Every officer in `tanods` gets a patrol status entry.
    pub async fn upsert_schedule(&self, mut schedule: Schedule) -> Option<Schedule> {
        for officer in &schedule.tanods {
            if schedule.patrol_entry(officer).is_none() {
                schedule
                    .patrol_status
                    .push(PatrolStatus::not_started(officer.clone()));
            }
        }

        let mut state = self.state.write().await;
        let previous = state.schedules.remove(&schedule.id);
        if let Some(prev) = &previous {
            state.unindex(prev);
        }
        state.index(&schedule);
        state.schedules.insert(schedule.id.clone(), schedule);
        previous
    }

    /// Remove a schedule. Returns it if it existed.
    pub async fn remove_schedule(&self, schedule_id: &ScheduleId) -> Option<Schedule> {
        let mut state = self.state.write().await;
        let removed = state.schedules.remove(schedule_id);
        if let Some(schedule) = &removed {
            state.unindex(schedule);
        }
        removed
    }

    /// Set one officer's patrol state on a schedule.
    ///
    /// `Started` stamps the start time and clears the end time; `Completed`
    /// and `Absent` stamp the end time.
    pub async fn set_patrol_state(
        &self,
        schedule_id: &ScheduleId,
        officer_id: &OfficerId,
        status: PatrolState,
        at: DateTime<Utc>,
    ) -> TrackingResult<Schedule> {
        let mut state = self.state.write().await;
        let schedule = state
            .schedules
            .get_mut(schedule_id)
            .ok_or_else(|| TrackingError::NotFound(format!("schedule {}", schedule_id)))?;

        if !schedule.includes(officer_id) {
            return Err(TrackingError::Validation(format!(
                "officer {} is not assigned to schedule {}",
                officer_id, schedule_id
            )));
        }

        if schedule.patrol_entry(officer_id).is_none() {
            schedule
                .patrol_status
                .push(PatrolStatus::not_started(officer_id.clone()));
        }
        if let Some(entry) = schedule.patrol_entry_mut(officer_id) {
            entry.status = status;
            match status {
                PatrolState::Started => {
                    entry.start_time = Some(at);
                    entry.end_time = None;
                }
                PatrolState::Completed | PatrolState::Absent => entry.end_time = Some(at),
                PatrolState::NotStarted => {
                    entry.start_time = None;
                    entry.end_time = None;
                }
            }
        }

        Ok(schedule.clone())
    }

    /// Insert or replace a patrol area. Returns the previous version.
    pub async fn upsert_patrol_area(&self, area: PatrolArea) -> Option<PatrolArea> {
        let mut state = self.state.write().await;
        state.areas.insert(area.id.clone(), area)
    }

    pub async fn schedule_count(&self) -> usize {
        self.state.read().await.schedules.len()
    }
}

#[async_trait]
impl ScheduleSource for ScheduleBook {
    async fn schedules_for_officer(
        &self,
        officer_id: &OfficerId,
        now: DateTime<Utc>,
    ) -> TrackingResult<Vec<Schedule>> {
        let state = self.state.read().await;
        let Some(entries) = state.by_officer.get(officer_id) else {
            return Ok(Vec::new());
        };

        Ok(entries
            .iter()
            .rev()
            .take_while(|(end_time, _)| *end_time > now)
            .filter_map(|(_, id)| state.schedules.get(id))
            .cloned()
            .collect())
    }

    async fn get_schedule(&self, schedule_id: &ScheduleId) -> TrackingResult<Option<Schedule>> {
        let state = self.state.read().await;
        Ok(state.schedules.get(schedule_id).cloned())
    }

    async fn schedules_for_area(&self, area_id: &PatrolAreaId) -> TrackingResult<Vec<Schedule>> {
        let state = self.state.read().await;
        let mut schedules: Vec<Schedule> = state
            .by_area
            .get(area_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.schedules.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        schedules.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(schedules)
    }

    async fn get_patrol_area(&self, area_id: &PatrolAreaId) -> TrackingResult<Option<PatrolArea>> {
        let state = self.state.read().await;
        Ok(state.areas.get(area_id).cloned())
    }
}
