//! Registry domain events
//!
//! The registry emits one event per state transition it performs, after the
//! write has landed in the store and while the per-officer write lock is held.
//! The fan-out layer is the only consumer.

use serde::{Deserialize, Serialize};

use crate::message::TrackingMessage;
use crate::types::{OfficerId, TrackedOfficer};

/// A change applied to the live location registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A record was written and is active (new position or patrol change)
    Upserted(TrackedOfficer),
    /// A record was switched inactive (logout, patrol end or staleness)
    Deactivated(TrackedOfficer),
}

impl RegistryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upserted(_) => "upserted",
            Self::Deactivated(_) => "deactivated",
        }
    }

    pub fn record(&self) -> &TrackedOfficer {
        match self {
            Self::Upserted(record) | Self::Deactivated(record) => record,
        }
    }

    pub fn officer_id(&self) -> &OfficerId {
        self.record().officer_id()
    }

    /// Both kinds travel as a full-record `locationUpdate`; deactivation is
    /// signalled by `isActive == false`.
    pub fn into_message(self) -> TrackingMessage {
        match self {
            Self::Upserted(location) | Self::Deactivated(location) => {
                TrackingMessage::LocationUpdate { location }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfficerLocation;
    use chrono::Utc;

    fn tracked(active: bool) -> TrackedOfficer {
        let mut location = OfficerLocation::new_inactive(OfficerId::new("B"), "#808080", Utc::now());
        location.is_active = active;
        TrackedOfficer {
            location,
            officer_name: None,
            officer_picture: None,
            patrol_area: None,
        }
    }

    #[test]
    fn test_deactivation_becomes_inactive_location_update() {
        let event = RegistryEvent::Deactivated(tracked(false));
        assert_eq!(event.kind(), "deactivated");
        assert_eq!(event.officer_id().as_str(), "B");

        match event.into_message() {
            TrackingMessage::LocationUpdate { location } => assert!(!location.is_active()),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
