//! Wire messages on the tracking channel
//!
//! ```json
//! {"type": "initializeLocations", "locations": [ ... ]}
//! {"type": "locationUpdate", "location": { ... }}
//! ```

use serde::{Deserialize, Serialize};

use crate::types::TrackedOfficer;

/// Server-to-viewer messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TrackingMessage {
    /// Full snapshot of active officers, sent first on every (re)subscribe
    InitializeLocations { locations: Vec<TrackedOfficer> },
    /// One full record; `isActive == false` means remove the marker
    LocationUpdate { location: TrackedOfficer },
}

impl TrackingMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::InitializeLocations { .. } => "initializeLocations",
            Self::LocationUpdate { .. } => "locationUpdate",
        }
    }
}

/// Viewer-to-server messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewerCommand {
    /// Ask for a fresh snapshot on the same connection
    Resubscribe,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GeoPoint, OfficerId, OfficerLocation};
    use chrono::Utc;

    #[test]
    fn test_message_tags() {
        let mut location = OfficerLocation::new_inactive(OfficerId::new("A"), "#808080", Utc::now());
        location.position = Some(GeoPoint::new(14.7, 121.05));
        location.is_active = true;
        let msg = TrackingMessage::LocationUpdate {
            location: TrackedOfficer {
                location,
                officer_name: None,
                officer_picture: None,
                patrol_area: None,
            },
        };

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "locationUpdate");
        assert_eq!(value["location"]["officerId"], "A");
        assert_eq!(msg.type_name(), "locationUpdate");

        let init = TrackingMessage::InitializeLocations { locations: vec![] };
        let value = serde_json::to_value(&init).unwrap();
        assert_eq!(value["type"], "initializeLocations");
        assert!(value["locations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_viewer_command_parsing() {
        let cmd: ViewerCommand = serde_json::from_str(r#"{"type":"resubscribe"}"#).unwrap();
        assert_eq!(cmd, ViewerCommand::Resubscribe);
        assert!(serde_json::from_str::<ViewerCommand>(r#"{"type":"other"}"#).is_err());
    }
}
