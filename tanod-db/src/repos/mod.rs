//! Tanod repository implementations

mod memory_location;
mod officer_directory;
mod schedule_book;
mod sled_location;

pub use memory_location::*;
pub use officer_directory::*;
pub use schedule_book::*;
pub use sled_location::*;

use crate::error::DbResult;
use std::path::Path;
use std::sync::Arc;
use tanod_core::LocationStore;

/// Tracking stores - main entry point for storage wiring
#[derive(Clone)]
pub struct TrackingStores {
    pub locations: Arc<dyn LocationStore>,
    pub schedules: Arc<ScheduleBook>,
    pub officers: Arc<MemoryOfficerDirectory>,
}

impl TrackingStores {
    /// Everything in memory
    pub fn in_memory() -> Self {
        Self::with_location_store(Arc::new(MemoryLocationStore::new()))
    }

    /// Locations persisted with sled at `path`; schedules and profiles in memory
    pub fn with_sled<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Ok(Self::with_location_store(Arc::new(SledLocationStore::open(
            path,
        )?)))
    }

    pub fn with_location_store(locations: Arc<dyn LocationStore>) -> Self {
        Self {
            locations,
            schedules: Arc::new(ScheduleBook::new()),
            officers: Arc::new(MemoryOfficerDirectory::new()),
        }
    }

    /// Check the location store answers queries
    pub async fn health_check(&self) -> bool {
        self.locations.list_active().await.is_ok()
    }
}
