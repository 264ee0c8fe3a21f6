//! Sled-backed location store
//!
//! Records are kept as JSON in a single tree keyed by officer id. Revisions
//! come from sled's monotonic id generator so they keep increasing across
//! restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::error::{DbError, DbResult};
use tanod_core::{LocationStore, OfficerId, OfficerLocation, ScheduleId, TrackingResult};

const LOCATIONS_TREE: &str = "officer_locations";

/// Persistent `LocationStore`
#[derive(Debug, Clone)]
pub struct SledLocationStore {
    db: sled::Db,
    locations: sled::Tree,
}

impl SledLocationStore {
    /// Open or create the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)
            .map_err(|e| DbError::Storage(format!("Failed to open sled db: {}", e)))?;
        let locations = db
            .open_tree(LOCATIONS_TREE)
            .map_err(|e| DbError::Storage(format!("Failed to open locations tree: {}", e)))?;
        Ok(Self { db, locations })
    }

    /// Flush to disk
    pub fn flush(&self) -> DbResult<()> {
        self.db
            .flush()
            .map_err(|e| DbError::Storage(format!("Failed to flush db: {}", e)))?;
        Ok(())
    }

    fn scan<F>(&self, mut keep: F) -> DbResult<Vec<OfficerLocation>>
    where
        F: FnMut(&OfficerLocation) -> bool,
    {
        let mut out = Vec::new();
        for item in self.locations.iter() {
            let (_, value) = item
                .map_err(|e| DbError::Storage(format!("Failed to iterate locations: {}", e)))?;
            let record: OfficerLocation = serde_json::from_slice(&value)?;
            if keep(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl LocationStore for SledLocationStore {
    async fn get(&self, officer_id: &OfficerId) -> TrackingResult<Option<OfficerLocation>> {
        let bytes = self
            .locations
            .get(officer_id.as_str().as_bytes())
            .map_err(|e| DbError::Storage(format!("Failed to get location: {}", e)))?;
        match bytes {
            Some(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).map_err(DbError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn upsert(&self, mut location: OfficerLocation) -> TrackingResult<OfficerLocation> {
        let id = self
            .db
            .generate_id()
            .map_err(|e| DbError::Storage(format!("Failed to generate revision: {}", e)))?;
        location.revision = id + 1;

        let value = serde_json::to_vec(&location).map_err(DbError::from)?;
        self.locations
            .insert(location.officer_id.as_str().as_bytes(), value)
            .map_err(|e| DbError::Storage(format!("Failed to save location: {}", e)))?;
        Ok(location)
    }

    async fn list_active(&self) -> TrackingResult<Vec<OfficerLocation>> {
        Ok(self.scan(|r| r.is_active)?)
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> TrackingResult<Vec<OfficerLocation>> {
        Ok(self.scan(|r| r.is_active && r.last_update < cutoff)?)
    }

    async fn list_by_schedule(
        &self,
        schedule_id: &ScheduleId,
    ) -> TrackingResult<Vec<OfficerLocation>> {
        Ok(self.scan(|r| r.current_schedule_id.as_ref() == Some(schedule_id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tanod_core::GeoPoint;
    use tempfile::tempdir;

    fn active(id: &str, last_update: DateTime<Utc>) -> OfficerLocation {
        let mut loc = OfficerLocation::new_inactive(OfficerId::new(id), "#808080", last_update);
        loc.position = Some(GeoPoint::new(14.7, 121.05));
        loc.is_active = true;
        loc
    }

    #[tokio::test]
    async fn test_sled_location_crud() {
        let dir = tempdir().unwrap();
        let store = SledLocationStore::open(dir.path()).unwrap();

        let stored = store.upsert(active("A", Utc::now())).await.unwrap();
        assert!(stored.revision > 0);

        let fetched = store.get(&OfficerId::new("A")).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert!(store.get(&OfficerId::new("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sled_queries() {
        let dir = tempdir().unwrap();
        let store = SledLocationStore::open(dir.path()).unwrap();
        let now = Utc::now();

        let mut on_patrol = active("A", now);
        on_patrol.current_schedule_id = Some(ScheduleId::new("S"));
        store.upsert(on_patrol).await.unwrap();
        store
            .upsert(active("B", now - Duration::minutes(10)))
            .await
            .unwrap();

        assert_eq!(store.list_active().await.unwrap().len(), 2);
        let stale = store.list_stale(now - Duration::minutes(5)).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].officer_id.as_str(), "B");
        let on_s = store.list_by_schedule(&ScheduleId::new("S")).await.unwrap();
        assert_eq!(on_s.len(), 1);
    }

    #[tokio::test]
    async fn test_sled_persistence_and_revision_order() {
        let dir = tempdir().unwrap();

        let first_revision = {
            let store = SledLocationStore::open(dir.path()).unwrap();
            let stored = store.upsert(active("A", Utc::now())).await.unwrap();
            store.flush().unwrap();
            stored.revision
        };

        {
            let store = SledLocationStore::open(dir.path()).unwrap();
            let records = store.list_active().await.unwrap();
            assert_eq!(records.len(), 1);

            let rewritten = store.upsert(active("A", Utc::now())).await.unwrap();
            assert!(rewritten.revision > first_revision);
        }
    }
}
