//! In-memory location store
//!
//! Thread-safe store for tests and deployments without a data directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tanod_core::{LocationStore, OfficerId, OfficerLocation, ScheduleId, TrackingResult};

#[derive(Debug, Default)]
struct LocationState {
    records: HashMap<OfficerId, OfficerLocation>,
    /// Last revision handed out; bumped under the same write lock as the record
    revision: u64,
}

/// In-memory `LocationStore`
#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    state: Arc<RwLock<LocationState>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, active or not
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn get(&self, officer_id: &OfficerId) -> TrackingResult<Option<OfficerLocation>> {
        let state = self.state.read().await;
        Ok(state.records.get(officer_id).cloned())
    }

    async fn upsert(&self, mut location: OfficerLocation) -> TrackingResult<OfficerLocation> {
        let mut state = self.state.write().await;
        state.revision += 1;
        location.revision = state.revision;
        state.records.insert(location.officer_id.clone(), location.clone());
        Ok(location)
    }

    async fn list_active(&self) -> TrackingResult<Vec<OfficerLocation>> {
        let state = self.state.read().await;
        Ok(state.records.values().filter(|r| r.is_active).cloned().collect())
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>) -> TrackingResult<Vec<OfficerLocation>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|r| r.is_active && r.last_update < cutoff)
            .cloned()
            .collect())
    }

    async fn list_by_schedule(
        &self,
        schedule_id: &ScheduleId,
    ) -> TrackingResult<Vec<OfficerLocation>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .values()
            .filter(|r| r.current_schedule_id.as_ref() == Some(schedule_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tanod_core::GeoPoint;

    fn active(id: &str, last_update: DateTime<Utc>) -> OfficerLocation {
        let mut loc = OfficerLocation::new_inactive(OfficerId::new(id), "#808080", last_update);
        loc.position = Some(GeoPoint::new(14.7, 121.05));
        loc.is_active = true;
        loc
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_bumps_revision() {
        let store = MemoryLocationStore::new();
        let now = Utc::now();

        let first = store.upsert(active("A", now)).await.unwrap();
        let second = store.upsert(active("A", now)).await.unwrap();

        assert!(second.revision > first.revision);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.get(&OfficerId::new("A")).await.unwrap().unwrap().revision,
            second.revision
        );
    }

    #[tokio::test]
    async fn test_list_active_and_stale() {
        let store = MemoryLocationStore::new();
        let now = Utc::now();

        store.upsert(active("fresh", now)).await.unwrap();
        store
            .upsert(active("old", now - Duration::minutes(10)))
            .await
            .unwrap();
        let mut gone = active("gone", now - Duration::minutes(10));
        gone.is_active = false;
        store.upsert(gone).await.unwrap();

        assert_eq!(store.list_active().await.unwrap().len(), 2);

        let stale = store
            .list_stale(now - Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].officer_id.as_str(), "old");
    }

    #[tokio::test]
    async fn test_list_by_schedule() {
        let store = MemoryLocationStore::new();
        let mut loc = active("A", Utc::now());
        loc.current_schedule_id = Some(ScheduleId::new("S"));
        store.upsert(loc).await.unwrap();
        store.upsert(active("B", Utc::now())).await.unwrap();

        let on_s = store.list_by_schedule(&ScheduleId::new("S")).await.unwrap();
        assert_eq!(on_s.len(), 1);
        assert_eq!(on_s[0].officer_id.as_str(), "A");
    }

    #[tokio::test]
    async fn test_concurrent_writes_get_distinct_revisions() {
        let store = Arc::new(MemoryLocationStore::new());

        let mut tasks = Vec::new();
        for i in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .upsert(active(&format!("officer-{}", i % 5), Utc::now()))
                    .await
                    .unwrap()
                    .revision
            }));
        }
        let mut revisions = Vec::new();
        for task in tasks {
            revisions.push(task.await.unwrap());
        }
        revisions.sort_unstable();
        revisions.dedup();

        assert_eq!(revisions, (1..=50).collect::<Vec<u64>>());
        // Each stored record holds the last revision written for it
        let latest = store.list_active().await.unwrap();
        assert_eq!(latest.len(), 5);
        assert!(latest.iter().any(|r| r.revision == 50));
    }
}
