//! Marker styling
//!
//! Pure functions of the received record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tanod_core::{OfficerLocation, TrackedOfficer};

/// Icon appearance of one marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: String,
    /// Pulsing ring shown while the officer is on patrol
    pub pulse: bool,
}

impl MarkerStyle {
    pub fn for_location(location: &OfficerLocation) -> Self {
        Self {
            color: location.marker_color.clone(),
            pulse: location.is_on_patrol,
        }
    }
}

/// Popup content of one marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerPopup {
    pub title: String,
    pub picture: Option<String>,
    /// "On Patrol" or "Off Patrol"
    pub status: &'static str,
    /// Patrol area legend when on patrol
    pub area: Option<String>,
    pub last_update: DateTime<Utc>,
}

impl MarkerPopup {
    pub fn for_officer(officer: &TrackedOfficer) -> Self {
        let location = &officer.location;
        Self {
            title: officer
                .officer_name
                .clone()
                .unwrap_or_else(|| location.officer_id.to_string()),
            picture: officer.officer_picture.clone(),
            status: if location.is_on_patrol {
                "On Patrol"
            } else {
                "Off Patrol"
            },
            area: officer
                .patrol_area
                .as_ref()
                .filter(|_| location.is_on_patrol)
                .map(|area| area.legend.clone()),
            last_update: location.last_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanod_core::{OfficerId, PatrolAreaSummary, ScheduleId};

    fn tracked(on_patrol: bool) -> TrackedOfficer {
        let mut location = OfficerLocation::new_inactive(OfficerId::new("A"), "#808080", Utc::now());
        if on_patrol {
            location.is_on_patrol = true;
            location.marker_color = "blue".to_string();
            location.current_schedule_id = Some(ScheduleId::new("S"));
        }
        TrackedOfficer {
            location,
            officer_name: None,
            officer_picture: None,
            patrol_area: on_patrol.then(|| PatrolAreaSummary {
                id: tanod_core::PatrolAreaId::new("north"),
                color: "blue".to_string(),
                legend: "North Sector".to_string(),
            }),
        }
    }

    #[test]
    fn test_style_follows_record() {
        let style = MarkerStyle::for_location(&tracked(true).location);
        assert_eq!(style.color, "blue");
        assert!(style.pulse);

        let style = MarkerStyle::for_location(&tracked(false).location);
        assert_eq!(style.color, "#808080");
        assert!(!style.pulse);
    }

    #[test]
    fn test_popup_falls_back_to_officer_id() {
        let popup = MarkerPopup::for_officer(&tracked(false));
        assert_eq!(popup.title, "A");
        assert_eq!(popup.status, "Off Patrol");
        assert!(popup.area.is_none());

        let popup = MarkerPopup::for_officer(&tracked(true));
        assert_eq!(popup.status, "On Patrol");
        assert_eq!(popup.area.as_deref(), Some("North Sector"));
    }
}
