//! Patrol area types (read-only here, used for marker coloring)

use serde::{Deserialize, Serialize};

/// Patrol Area ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatrolAreaId(pub String);

impl PatrolAreaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatrolAreaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Patrol area as owned by the scheduling subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolArea {
    pub id: PatrolAreaId,
    /// Display color applied to markers of officers patrolling this area
    pub color: String,
    pub legend: String,
    /// Polygon vertices as `[latitude, longitude]`
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

impl PatrolArea {
    pub fn new(id: impl Into<String>, color: impl Into<String>, legend: impl Into<String>) -> Self {
        Self {
            id: PatrolAreaId::new(id),
            color: color.into(),
            legend: legend.into(),
            coordinates: Vec::new(),
        }
    }

    pub fn summary(&self) -> PatrolAreaSummary {
        PatrolAreaSummary {
            id: self.id.clone(),
            color: self.color.clone(),
            legend: self.legend.clone(),
        }
    }
}

/// Patrol area fields populated into tracked records for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolAreaSummary {
    pub id: PatrolAreaId,
    pub color: String,
    pub legend: String,
}
