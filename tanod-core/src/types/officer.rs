//! Officer identity types

use serde::{Deserialize, Serialize};

/// Officer ID - identity of a tanod whose position is tracked
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficerId(pub String);

impl OfficerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OfficerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verified identity handed to every registry operation by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerIdentity {
    pub officer_id: OfficerId,
    pub role: String,
}

impl OfficerIdentity {
    pub fn new(officer_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            officer_id: OfficerId::new(officer_id),
            role: role.into(),
        }
    }
}

/// Display fields for an officer, owned by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficerProfile {
    pub officer_id: OfficerId,
    pub name: String,
    pub picture: Option<String>,
}

impl OfficerProfile {
    pub fn new(officer_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            officer_id: OfficerId::new(officer_id),
            name: name.into(),
            picture: None,
        }
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }
}
