//! Schedule / patrol-area resolver
//!
//! A pure read over the scheduling subsystem. Called on every location report,
//! so it relies on the source's per-officer end-time index instead of scanning
//! all schedules.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use tanod_core::{
    ActivePatrol, OfficerId, PatrolArea, PatrolState, ScheduleId, ScheduleSource, TrackingError,
    TrackingResult,
};

/// Resolves the active patrol for an officer
#[derive(Clone)]
pub struct PatrolResolver {
    source: Arc<dyn ScheduleSource>,
}

impl PatrolResolver {
    pub fn new(source: Arc<dyn ScheduleSource>) -> Self {
        Self { source }
    }

    /// The schedule the officer is currently patrolling, if any.
    ///
    /// Among unexpired schedules containing the officer whose patrol entry
    /// for them is `Started`, the one started last wins (ties broken by
    /// schedule id). Lookup failures come back as `TrackingError::Resolution`.
    pub async fn resolve_active_patrol(
        &self,
        officer_id: &OfficerId,
        now: DateTime<Utc>,
    ) -> TrackingResult<Option<ActivePatrol>> {
        let schedules = self
            .source
            .schedules_for_officer(officer_id, now)
            .await
            .map_err(resolution)?;

        let started: Vec<_> = schedules
            .iter()
            .filter(|s| !s.is_expired(now) && s.includes(officer_id))
            .filter_map(|s| {
                s.patrol_entry(officer_id)
                    .filter(|entry| entry.status == PatrolState::Started)
                    .map(|entry| (s, entry.start_time))
            })
            .collect();

        if started.len() > 1 {
            warn!(
                officer_id = %officer_id,
                count = started.len(),
                "Officer started on overlapping schedules, using the most recently started"
            );
        }

        let Some((schedule, started_at)) = started
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)))
        else {
            return Ok(None);
        };

        let color = match &schedule.patrol_area {
            Some(area_id) => self
                .source
                .get_patrol_area(area_id)
                .await
                .map_err(resolution)?
                .map(|area| area.color),
            None => None,
        };

        debug!(
            officer_id = %officer_id,
            schedule_id = %schedule.id,
            "Active patrol resolved"
        );

        Ok(Some(ActivePatrol {
            schedule_id: schedule.id.clone(),
            color,
            started_at,
        }))
    }

    /// Patrol area of a schedule, for populating display fields
    pub async fn patrol_area_for(&self, schedule_id: &ScheduleId) -> TrackingResult<Option<PatrolArea>> {
        let Some(schedule) = self
            .source
            .get_schedule(schedule_id)
            .await
            .map_err(resolution)?
        else {
            return Ok(None);
        };
        match &schedule.patrol_area {
            Some(area_id) => self.source.get_patrol_area(area_id).await.map_err(resolution),
            None => Ok(None),
        }
    }

    pub fn source(&self) -> &Arc<dyn ScheduleSource> {
        &self.source
    }
}

fn resolution(e: TrackingError) -> TrackingError {
    match e {
        TrackingError::Resolution(_) => e,
        other => TrackingError::Resolution(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::ScheduleBook;
    use chrono::Duration;
    use tanod_core::{PatrolArea, PatrolAreaId, Schedule};

    async fn setup() -> (Arc<ScheduleBook>, PatrolResolver) {
        let book = Arc::new(ScheduleBook::new());
        book.upsert_patrol_area(PatrolArea::new("north", "blue", "North"))
            .await;
        book.upsert_patrol_area(PatrolArea::new("south", "red", "South"))
            .await;
        let resolver = PatrolResolver::new(book.clone());
        (book, resolver)
    }

    #[tokio::test]
    async fn test_no_schedule_means_no_patrol() {
        let (_book, resolver) = setup().await;
        let resolved = resolver
            .resolve_active_patrol(&OfficerId::new("A"), Utc::now())
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_started_schedule_resolves_with_area_color() {
        let (book, resolver) = setup().await;
        let now = Utc::now();
        let a = OfficerId::new("A");
        book.upsert_schedule(
            Schedule::new("S", now - Duration::hours(1), now + Duration::hours(7))
                .with_tanod(a.clone())
                .with_patrol_area(PatrolAreaId::new("north")),
        )
        .await;

        assert!(resolver.resolve_active_patrol(&a, now).await.unwrap().is_none());

        book.set_patrol_state(&ScheduleId::new("S"), &a, PatrolState::Started, now)
            .await
            .unwrap();
        let resolved = resolver.resolve_active_patrol(&a, now).await.unwrap().unwrap();
        assert_eq!(resolved.schedule_id.as_str(), "S");
        assert_eq!(resolved.color.as_deref(), Some("blue"));
        assert_eq!(resolved.started_at, Some(now));
    }

    #[tokio::test]
    async fn test_expired_started_schedule_is_ignored() {
        let (book, resolver) = setup().await;
        let now = Utc::now();
        let a = OfficerId::new("A");
        book.upsert_schedule(
            Schedule::new("S", now - Duration::hours(2), now + Duration::minutes(30))
                .with_tanod(a.clone()),
        )
        .await;
        book.set_patrol_state(&ScheduleId::new("S"), &a, PatrolState::Started, now)
            .await
            .unwrap();

        let later = now + Duration::hours(1);
        assert!(resolver.resolve_active_patrol(&a, later).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overlapping_started_last_started_wins() {
        let (book, resolver) = setup().await;
        let now = Utc::now();
        let a = OfficerId::new("A");
        for (id, area) in [("S1", "north"), ("S2", "south")] {
            book.upsert_schedule(
                Schedule::new(id, now - Duration::hours(1), now + Duration::hours(7))
                    .with_tanod(a.clone())
                    .with_patrol_area(PatrolAreaId::new(area)),
            )
            .await;
        }

        book.set_patrol_state(&ScheduleId::new("S2"), &a, PatrolState::Started, now - Duration::minutes(30))
            .await
            .unwrap();
        book.set_patrol_state(&ScheduleId::new("S1"), &a, PatrolState::Started, now - Duration::minutes(5))
            .await
            .unwrap();

        let resolved = resolver.resolve_active_patrol(&a, now).await.unwrap().unwrap();
        assert_eq!(resolved.schedule_id.as_str(), "S1");
        assert_eq!(resolved.color.as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn test_schedule_without_area_has_no_color() {
        let (book, resolver) = setup().await;
        let now = Utc::now();
        let a = OfficerId::new("A");
        book.upsert_schedule(
            Schedule::new("S", now, now + Duration::hours(8)).with_tanod(a.clone()),
        )
        .await;
        book.set_patrol_state(&ScheduleId::new("S"), &a, PatrolState::Started, now)
            .await
            .unwrap();

        let resolved = resolver.resolve_active_patrol(&a, now).await.unwrap().unwrap();
        assert!(resolved.color.is_none());
        assert!(resolver
            .patrol_area_for(&ScheduleId::new("S"))
            .await
            .unwrap()
            .is_none());
    }
}
