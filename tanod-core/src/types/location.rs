//! Officer location records
//!
//! [`OfficerLocation`] is the single stored record per officer. Its patrol
//! fields are derived by the registry and must satisfy:
//!
//! - `is_on_patrol` implies `current_schedule_id` is set and `marker_color`
//!   is that schedule's patrol-area color
//! - otherwise `marker_color` is the neutral color
//! - `is_active` implies `position` is set

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{OfficerId, PatrolAreaSummary, ScheduleId};
use crate::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

/// A validated geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the geographic ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
            && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
    }
}

/// The resolver's answer for an officer currently on patrol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePatrol {
    pub schedule_id: ScheduleId,
    /// Patrol-area color; `None` when the schedule has no resolvable area
    pub color: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// One officer's last known position and activity flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerLocation {
    pub officer_id: OfficerId,
    #[serde(flatten)]
    pub position: Option<GeoPoint>,
    pub last_update: DateTime<Utc>,
    pub is_active: bool,
    pub current_schedule_id: Option<ScheduleId>,
    pub marker_color: String,
    pub is_on_patrol: bool,
    /// Store-assigned, strictly increasing per write
    #[serde(default)]
    pub revision: u64,
}

impl OfficerLocation {
    /// Fresh record: inactive, neutral, no position
    pub fn new_inactive(
        officer_id: OfficerId,
        neutral_color: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            officer_id,
            position: None,
            last_update: now,
            is_active: false,
            current_schedule_id: None,
            marker_color: neutral_color.into(),
            is_on_patrol: false,
            revision: 0,
        }
    }

    /// Set the derived patrol fields from a resolution result.
    ///
    /// Returns true if any of them changed.
    pub fn apply_patrol(&mut self, patrol: Option<&ActivePatrol>, neutral_color: &str) -> bool {
        let (schedule_id, color, on_patrol) = match patrol {
            Some(p) => (
                Some(p.schedule_id.clone()),
                p.color.clone().unwrap_or_else(|| neutral_color.to_string()),
                true,
            ),
            None => (None, neutral_color.to_string(), false),
        };

        let changed = self.current_schedule_id != schedule_id
            || self.marker_color != color
            || self.is_on_patrol != on_patrol;

        self.current_schedule_id = schedule_id;
        self.marker_color = color;
        self.is_on_patrol = on_patrol;
        changed
    }

    /// Last update strictly older than `now - threshold`
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.last_update < now - threshold
    }
}

/// A location record populated with display fields for viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedOfficer {
    #[serde(flatten)]
    pub location: OfficerLocation,
    pub officer_name: Option<String>,
    pub officer_picture: Option<String>,
    pub patrol_area: Option<PatrolAreaSummary>,
}

impl TrackedOfficer {
    pub fn officer_id(&self) -> &OfficerId {
        &self.location.officer_id
    }

    pub fn is_active(&self) -> bool {
        self.location.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatrolAreaId;

    fn record() -> OfficerLocation {
        OfficerLocation::new_inactive(OfficerId::new("A"), "#808080", Utc::now())
    }

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(14.70, 121.05).is_valid());
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.1).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_apply_patrol_sets_and_clears() {
        let mut loc = record();
        let patrol = ActivePatrol {
            schedule_id: ScheduleId::new("S"),
            color: Some("blue".to_string()),
            started_at: None,
        };

        assert!(loc.apply_patrol(Some(&patrol), "#808080"));
        assert!(loc.is_on_patrol);
        assert_eq!(loc.marker_color, "blue");
        assert_eq!(loc.current_schedule_id, Some(ScheduleId::new("S")));

        assert!(!loc.apply_patrol(Some(&patrol), "#808080"));

        assert!(loc.apply_patrol(None, "#808080"));
        assert!(!loc.is_on_patrol);
        assert_eq!(loc.marker_color, "#808080");
        assert!(loc.current_schedule_id.is_none());
    }

    #[test]
    fn test_apply_patrol_without_area_uses_neutral() {
        let mut loc = record();
        let patrol = ActivePatrol {
            schedule_id: ScheduleId::new("S"),
            color: None,
            started_at: None,
        };
        loc.apply_patrol(Some(&patrol), "#808080");
        assert!(loc.is_on_patrol);
        assert_eq!(loc.marker_color, "#808080");
    }

    #[test]
    fn test_is_stale() {
        let now = Utc::now();
        let mut loc = record();
        loc.last_update = now - Duration::seconds(301);
        assert!(loc.is_stale(now, Duration::seconds(300)));
        loc.last_update = now - Duration::seconds(299);
        assert!(!loc.is_stale(now, Duration::seconds(300)));
    }

    #[test]
    fn test_tracked_officer_wire_shape() {
        let mut loc = record();
        loc.position = Some(GeoPoint::new(14.7, 121.05));
        loc.is_active = true;
        let tracked = TrackedOfficer {
            location: loc,
            officer_name: Some("Juan".to_string()),
            officer_picture: None,
            patrol_area: Some(PatrolAreaSummary {
                id: PatrolAreaId::new("north"),
                color: "blue".to_string(),
                legend: "North".to_string(),
            }),
        };

        let value = serde_json::to_value(&tracked).unwrap();
        assert_eq!(value["officerId"], "A");
        assert_eq!(value["officerName"], "Juan");
        assert_eq!(value["latitude"], 14.7);
        assert_eq!(value["longitude"], 121.05);
        assert_eq!(value["isActive"], true);
        assert_eq!(value["isOnPatrol"], false);
        assert_eq!(value["markerColor"], "#808080");
        assert!(value["currentScheduleId"].is_null());
        assert_eq!(value["patrolArea"]["legend"], "North");

        let back: TrackedOfficer = serde_json::from_value(value).unwrap();
        assert_eq!(back, tracked);
    }

    #[test]
    fn test_positionless_record_omits_coordinates() {
        let value = serde_json::to_value(record()).unwrap();
        assert!(value.get("latitude").is_none());
        let back: OfficerLocation = serde_json::from_value(value).unwrap();
        assert!(back.position.is_none());
    }
}
