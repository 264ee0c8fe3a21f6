//! Location Registry Service
//!
//! The only writer of `OfficerLocation` records. Every write for one officer
//! runs under that officer's async lock, and the registry event for the write
//! is published before the lock is released, so events for a single officer
//! leave in the same order their writes landed in the store. Different
//! officers never contend.
//!
//! Schedule reconciliation (`on_patrol_status_change`) additionally holds a
//! registry-wide reconcile lock so two schedule events never interleave their
//! per-officer rewrites.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::repos::TrackingStores;
use crate::services::PatrolResolver;
use crate::validation::validate_coordinates;
use tanod_core::constants::{DEFAULT_NEUTRAL_COLOR, EVENT_CHANNEL_CAPACITY};
use tanod_core::{
    LocationStore, OfficerDirectory, OfficerId, OfficerLocation, OfficerProfile, PatrolAreaId,
    RegistryEvent, ScheduleId, ScheduleSource, TrackedOfficer, TrackingError, TrackingResult,
};

/// Live location registry
pub struct RegistryService {
    store: Arc<dyn LocationStore>,
    resolver: PatrolResolver,
    directory: Arc<dyn OfficerDirectory>,
    events: broadcast::Sender<RegistryEvent>,
    officer_locks: Mutex<HashMap<OfficerId, Arc<Mutex<()>>>>,
    reconcile_lock: Mutex<()>,
    neutral_color: String,
}

impl RegistryService {
    pub fn new(
        store: Arc<dyn LocationStore>,
        schedules: Arc<dyn ScheduleSource>,
        directory: Arc<dyn OfficerDirectory>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            resolver: PatrolResolver::new(schedules),
            directory,
            events,
            officer_locks: Mutex::new(HashMap::new()),
            reconcile_lock: Mutex::new(()),
            neutral_color: DEFAULT_NEUTRAL_COLOR.to_string(),
        }
    }

    /// Build over the standard store wiring
    pub fn from_stores(stores: &TrackingStores) -> Self {
        Self::new(
            stores.locations.clone(),
            stores.schedules.clone(),
            stores.officers.clone(),
        )
    }

    /// Override the marker color used off patrol
    pub fn with_neutral_color(mut self, color: impl Into<String>) -> Self {
        self.neutral_color = color.into();
        self
    }

    /// Receive every registry event published from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    async fn officer_lock(&self, officer_id: &OfficerId) -> Arc<Mutex<()>> {
        let mut locks = self.officer_locks.lock().await;
        locks
            .entry(officer_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn publish(&self, event: RegistryEvent) {
        debug!(
            officer_id = %event.officer_id(),
            kind = event.kind(),
            revision = event.record().location.revision,
            "Registry event"
        );
        // No receivers just means nobody is watching yet
        let _ = self.events.send(event);
    }

    // ==================== Reporting ====================

    /// Accept a position report from an officer.
    ///
    /// Validates the coordinates and the officer, re-resolves the active
    /// patrol, and writes the record as active with `last_update = now`.
    /// A failed resolution keeps the previously stored patrol fields; only a
    /// store failure fails the report.
    pub async fn report_location(
        &self,
        officer_id: &OfficerId,
        latitude: f64,
        longitude: f64,
    ) -> TrackingResult<TrackedOfficer> {
        let position = validate_coordinates(latitude, longitude)?;
        let profile = self
            .directory
            .get_profile(officer_id)
            .await?
            .ok_or_else(|| TrackingError::UnknownOfficer(officer_id.to_string()))?;

        let lock = self.officer_lock(officer_id).await;
        let _guard = lock.lock().await;

        let now = Utc::now();
        let mut record = self
            .store
            .get(officer_id)
            .await?
            .unwrap_or_else(|| OfficerLocation::new_inactive(officer_id.clone(), &self.neutral_color, now));

        match self.resolver.resolve_active_patrol(officer_id, now).await {
            Ok(patrol) => {
                record.apply_patrol(patrol.as_ref(), &self.neutral_color);
            }
            Err(e) => warn!(
                officer_id = %officer_id,
                error = %e,
                "Patrol resolution failed, keeping last known marker"
            ),
        }

        record.position = Some(position);
        record.last_update = now;
        record.is_active = true;

        let stored = self.store.upsert(record).await?;
        debug!(
            officer_id = %officer_id,
            revision = stored.revision,
            on_patrol = stored.is_on_patrol,
            "Location accepted"
        );

        let tracked = self.populate(stored, Some(profile)).await;
        self.publish(RegistryEvent::Upserted(tracked.clone()));
        Ok(tracked)
    }

    /// Every active record, populated for display, ordered by officer id
    pub async fn list_active(&self) -> TrackingResult<Vec<TrackedOfficer>> {
        let mut records = self.store.list_active().await?;
        records.sort_by(|a, b| a.officer_id.cmp(&b.officer_id));

        let mut tracked = Vec::with_capacity(records.len());
        for record in records {
            tracked.push(self.populate(record, None).await);
        }
        Ok(tracked)
    }

    // ==================== Session ====================

    /// Lazily create the officer's record when they authenticate.
    ///
    /// New records are inactive and neutral with no position, so nothing is
    /// published. Existing records are returned untouched.
    pub async fn open_session(&self, officer_id: &OfficerId) -> TrackingResult<OfficerLocation> {
        let lock = self.officer_lock(officer_id).await;
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.get(officer_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let mut record = OfficerLocation::new_inactive(officer_id.clone(), &self.neutral_color, now);
        match self.resolver.resolve_active_patrol(officer_id, now).await {
            Ok(patrol) => {
                record.apply_patrol(patrol.as_ref(), &self.neutral_color);
            }
            Err(e) => warn!(officer_id = %officer_id, error = %e, "Patrol resolution failed"),
        }

        let stored = self.store.upsert(record).await?;
        info!(officer_id = %officer_id, "Session opened");
        Ok(stored)
    }

    /// Switch the officer's record inactive and publish the removal.
    ///
    /// Returns `None` without publishing if there is no record or it is
    /// already inactive.
    pub async fn deactivate(&self, officer_id: &OfficerId) -> TrackingResult<Option<TrackedOfficer>> {
        let lock = self.officer_lock(officer_id).await;
        let _guard = lock.lock().await;

        let Some(mut record) = self.store.get(officer_id).await? else {
            return Ok(None);
        };
        if !record.is_active {
            return Ok(None);
        }

        record.is_active = false;
        let stored = self.store.upsert(record).await?;
        info!(officer_id = %officer_id, revision = stored.revision, "Officer deactivated");

        let tracked = self.populate(stored, None).await;
        self.publish(RegistryEvent::Deactivated(tracked.clone()));
        Ok(Some(tracked))
    }

    // ==================== Schedule reconciliation ====================

    /// Re-resolve every officer a schedule touches.
    ///
    /// Covers officers in the schedule's `patrolStatus` and `tanods`, plus
    /// officers whose stored record still points at the schedule (removed
    /// from it, or the schedule was deleted). Runs as one reconciliation: no
    /// other schedule change interleaves. Officers whose resolution fails are
    /// logged and skipped.
    ///
    /// Returns the officers whose record changed.
    pub async fn on_patrol_status_change(
        &self,
        schedule_id: &ScheduleId,
    ) -> TrackingResult<Vec<OfficerId>> {
        let _reconcile = self.reconcile_lock.lock().await;

        let mut officers: BTreeSet<OfficerId> = BTreeSet::new();
        match self.resolver.source().get_schedule(schedule_id).await {
            Ok(Some(schedule)) => officers.extend(schedule.referenced_officers()),
            Ok(None) => debug!(schedule_id = %schedule_id, "Schedule no longer exists"),
            Err(e) => {
                warn!(schedule_id = %schedule_id, error = %e, "Schedule lookup failed");
            }
        }
        for record in self.store.list_by_schedule(schedule_id).await? {
            officers.insert(record.officer_id);
        }

        let now = Utc::now();
        let mut changed = Vec::new();
        for officer_id in officers {
            match self.reconcile_officer(&officer_id, now).await {
                Ok(true) => changed.push(officer_id),
                Ok(false) => {}
                Err(e) => warn!(
                    officer_id = %officer_id,
                    schedule_id = %schedule_id,
                    error = %e,
                    "Skipping officer during schedule reconciliation"
                ),
            }
        }

        info!(
            schedule_id = %schedule_id,
            count = changed.len(),
            "Schedule change reconciled"
        );
        Ok(changed)
    }

    /// Reconcile every schedule that references a patrol area
    pub async fn on_patrol_area_change(&self, area_id: &PatrolAreaId) -> TrackingResult<Vec<OfficerId>> {
        let schedules = self.resolver.source().schedules_for_area(area_id).await?;

        let mut changed = Vec::new();
        for schedule in schedules {
            changed.extend(self.on_patrol_status_change(&schedule.id).await?);
        }
        info!(area_id = %area_id, count = changed.len(), "Patrol area change reconciled");
        Ok(changed)
    }

    /// Recompute one officer's patrol fields without touching position or
    /// `last_update`. Writes and publishes only when something changed;
    /// inactive records are written but not published.
    async fn reconcile_officer(&self, officer_id: &OfficerId, now: DateTime<Utc>) -> TrackingResult<bool> {
        let lock = self.officer_lock(officer_id).await;
        let _guard = lock.lock().await;

        let Some(mut record) = self.store.get(officer_id).await? else {
            return Ok(false);
        };

        let patrol = self.resolver.resolve_active_patrol(officer_id, now).await?;
        if !record.apply_patrol(patrol.as_ref(), &self.neutral_color) {
            return Ok(false);
        }

        let stored = self.store.upsert(record).await?;
        debug!(
            officer_id = %officer_id,
            on_patrol = stored.is_on_patrol,
            marker_color = %stored.marker_color,
            "Patrol fields updated"
        );
        if stored.is_active {
            let tracked = self.populate(stored, None).await;
            self.publish(RegistryEvent::Upserted(tracked));
        }
        Ok(true)
    }

    // ==================== Staleness ====================

    /// Deactivate active records whose `last_update` is older than
    /// `now - threshold`.
    ///
    /// Staleness is recomputed from the stored timestamp under the officer's
    /// lock, so a report landing mid-sweep is never clobbered and running the
    /// sweep twice expires nothing new. Returns the expired officers.
    pub async fn expire_stale(
        &self,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> TrackingResult<Vec<OfficerId>> {
        let candidates = self.store.list_stale(now - threshold).await?;

        let mut expired = Vec::new();
        for candidate in candidates {
            let officer_id = candidate.officer_id;
            let lock = self.officer_lock(&officer_id).await;
            let _guard = lock.lock().await;

            let Some(mut record) = self.store.get(&officer_id).await? else {
                continue;
            };
            if !record.is_active || !record.is_stale(now, threshold) {
                continue;
            }

            record.is_active = false;
            let stored = self.store.upsert(record).await?;
            let tracked = self.populate(stored, None).await;
            self.publish(RegistryEvent::Deactivated(tracked));
            expired.push(officer_id);
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "Stale officers deactivated");
        }
        Ok(expired)
    }

    /// Revert officers whose patrol schedule has run past its end time.
    ///
    /// An expired schedule produces no change event of its own, so active
    /// on-patrol records pointing at a schedule that has ended (or no longer
    /// exists) are re-resolved here. Runs under the reconcile lock like any
    /// other schedule reconciliation. Returns the officers whose record
    /// changed.
    pub async fn expire_ended_patrols(&self, now: DateTime<Utc>) -> TrackingResult<Vec<OfficerId>> {
        let _reconcile = self.reconcile_lock.lock().await;

        let mut changed = Vec::new();
        for record in self.store.list_active().await? {
            if !record.is_on_patrol {
                continue;
            }
            let Some(schedule_id) = record.current_schedule_id else {
                continue;
            };

            let ended = match self.resolver.source().get_schedule(&schedule_id).await {
                Ok(Some(schedule)) => schedule.is_expired(now),
                Ok(None) => true,
                Err(e) => {
                    warn!(schedule_id = %schedule_id, error = %e, "Schedule lookup failed");
                    continue;
                }
            };
            if !ended {
                continue;
            }

            match self.reconcile_officer(&record.officer_id, now).await {
                Ok(true) => changed.push(record.officer_id),
                Ok(false) => {}
                Err(e) => warn!(
                    officer_id = %record.officer_id,
                    schedule_id = %schedule_id,
                    error = %e,
                    "Skipping officer whose patrol ended"
                ),
            }
        }

        if !changed.is_empty() {
            info!(count = changed.len(), "Ended patrols reverted");
        }
        Ok(changed)
    }

    // ==================== Display ====================

    /// Attach officer display fields and the patrol area. Lookup failures
    /// leave the display fields empty.
    async fn populate(&self, location: OfficerLocation, profile: Option<OfficerProfile>) -> TrackedOfficer {
        let profile = match profile {
            Some(profile) => Some(profile),
            None => match self.directory.get_profile(&location.officer_id).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(officer_id = %location.officer_id, error = %e, "Profile lookup failed");
                    None
                }
            },
        };

        let patrol_area = match (&location.current_schedule_id, location.is_on_patrol) {
            (Some(schedule_id), true) => match self.resolver.patrol_area_for(schedule_id).await {
                Ok(area) => area.map(|a| a.summary()),
                Err(e) => {
                    warn!(schedule_id = %schedule_id, error = %e, "Patrol area lookup failed");
                    None
                }
            },
            _ => None,
        };

        TrackedOfficer {
            officer_name: profile.as_ref().map(|p| p.name.clone()),
            officer_picture: profile.and_then(|p| p.picture),
            patrol_area,
            location,
        }
    }
}
