//! Schedule types (owned by the scheduling subsystem, read-only here)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OfficerId, PatrolAreaId};

/// Schedule ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub String);

impl ScheduleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overall schedule status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScheduleStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
}

/// Per-officer patrol sub-state within a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatrolState {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    Started,
    Completed,
    Absent,
}

impl PatrolState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Started => "Started",
            Self::Completed => "Completed",
            Self::Absent => "Absent",
        }
    }
}

impl std::fmt::Display for PatrolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One officer's entry in a schedule's `patrolStatus` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolStatus {
    pub officer_id: OfficerId,
    #[serde(default)]
    pub status: PatrolState,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

impl PatrolStatus {
    pub fn not_started(officer_id: OfficerId) -> Self {
        Self {
            officer_id,
            status: PatrolState::NotStarted,
            start_time: None,
            end_time: None,
        }
    }
}

/// A time-boxed patrol assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    #[serde(default)]
    pub tanods: Vec<OfficerId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub patrol_area: Option<PatrolAreaId>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub patrol_status: Vec<PatrolStatus>,
}

impl Schedule {
    pub fn new(
        id: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ScheduleId::new(id),
            tanods: Vec::new(),
            start_time,
            end_time,
            patrol_area: None,
            status: ScheduleStatus::Upcoming,
            patrol_status: Vec::new(),
        }
    }

    /// Assign an officer, adding a "Not Started" patrol entry for them
    pub fn with_tanod(mut self, officer_id: OfficerId) -> Self {
        if !self.includes(&officer_id) {
            self.patrol_status
                .push(PatrolStatus::not_started(officer_id.clone()));
            self.tanods.push(officer_id);
        }
        self
    }

    pub fn with_patrol_area(mut self, area: PatrolAreaId) -> Self {
        self.patrol_area = Some(area);
        self
    }

    pub fn includes(&self, officer_id: &OfficerId) -> bool {
        self.tanods.contains(officer_id)
    }

    pub fn patrol_entry(&self, officer_id: &OfficerId) -> Option<&PatrolStatus> {
        self.patrol_status
            .iter()
            .find(|entry| &entry.officer_id == officer_id)
    }

    pub fn patrol_entry_mut(&mut self, officer_id: &OfficerId) -> Option<&mut PatrolStatus> {
        self.patrol_status
            .iter_mut()
            .find(|entry| &entry.officer_id == officer_id)
    }

    /// A schedule whose end time has passed can no longer hold an active patrol
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time <= now
    }

    /// Every officer this schedule refers to, from both `tanods` and `patrolStatus`
    pub fn referenced_officers(&self) -> Vec<OfficerId> {
        let mut officers: Vec<OfficerId> = self.tanods.clone();
        for entry in &self.patrol_status {
            if !officers.contains(&entry.officer_id) {
                officers.push(entry.officer_id.clone());
            }
        }
        officers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_patrol_state_wire_names() {
        let json = serde_json::to_string(&PatrolState::NotStarted).unwrap();
        assert_eq!(json, "\"Not Started\"");
        let parsed: PatrolState = serde_json::from_str("\"Started\"").unwrap();
        assert_eq!(parsed, PatrolState::Started);
    }

    #[test]
    fn test_with_tanod_adds_patrol_entry_once() {
        let now = Utc::now();
        let officer = OfficerId::new("A");
        let schedule = Schedule::new("S", now, now + Duration::hours(8))
            .with_tanod(officer.clone())
            .with_tanod(officer.clone());

        assert_eq!(schedule.tanods.len(), 1);
        assert_eq!(schedule.patrol_status.len(), 1);
        assert_eq!(
            schedule.patrol_entry(&officer).map(|e| e.status),
            Some(PatrolState::NotStarted)
        );
    }

    #[test]
    fn test_expiry_and_referenced_officers() {
        let now = Utc::now();
        let mut schedule = Schedule::new("S", now - Duration::hours(2), now - Duration::hours(1))
            .with_tanod(OfficerId::new("A"));
        schedule
            .patrol_status
            .push(PatrolStatus::not_started(OfficerId::new("B")));

        assert!(schedule.is_expired(now));
        assert_eq!(
            schedule.referenced_officers(),
            vec![OfficerId::new("A"), OfficerId::new("B")]
        );
    }

    #[test]
    fn test_schedule_deserializes_camel_case() {
        let json = r#"{
            "id": "S1",
            "tanods": ["A"],
            "startTime": "2024-01-01T00:00:00Z",
            "endTime": "2024-01-01T08:00:00Z",
            "patrolArea": "north",
            "status": "Ongoing",
            "patrolStatus": [{"officerId": "A", "status": "Started", "startTime": "2024-01-01T01:00:00Z"}]
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Ongoing);
        assert_eq!(schedule.patrol_area, Some(PatrolAreaId::new("north")));
        let entry = schedule.patrol_entry(&OfficerId::new("A")).unwrap();
        assert_eq!(entry.status, PatrolState::Started);
        assert!(entry.end_time.is_none());
    }
}
