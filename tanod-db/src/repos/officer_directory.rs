//! In-memory officer directory

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tanod_core::{OfficerDirectory, OfficerId, OfficerProfile, TrackingResult};

/// Officer profiles keyed by id, as provided by the user directory
#[derive(Debug, Default, Clone)]
pub struct MemoryOfficerDirectory {
    profiles: Arc<RwLock<HashMap<OfficerId, OfficerProfile>>>,
}

impl MemoryOfficerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub async fn upsert_profile(&self, profile: OfficerProfile) -> Option<OfficerProfile> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.officer_id.clone(), profile)
    }

    pub async fn remove_profile(&self, officer_id: &OfficerId) -> Option<OfficerProfile> {
        self.profiles.write().await.remove(officer_id)
    }
}

#[async_trait]
impl OfficerDirectory for MemoryOfficerDirectory {
    async fn get_profile(&self, officer_id: &OfficerId) -> TrackingResult<Option<OfficerProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(officer_id).cloned())
    }
}
