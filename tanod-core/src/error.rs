//! Error types for the tracking core

use thiserror::Error;

/// Tracking core errors
///
/// The variants map onto the failure classes of the tracking pipeline:
/// validation failures are rejected at the entry point and never stored,
/// resolution failures degrade to the last known color, and store failures
/// are the only ones surfaced as hard errors to a reporting officer.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown officer: {0}")]
    UnknownOfficer(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrackingError {
    /// Whether the caller should retry the operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result type alias for tracking operations
pub type TrackingResult<T> = Result<T, TrackingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_errors_are_retryable() {
        assert!(TrackingError::Store("down".into()).is_retryable());
        assert!(!TrackingError::Validation("bad".into()).is_retryable());
        assert!(!TrackingError::UnknownOfficer("x".into()).is_retryable());
        assert!(!TrackingError::Resolution("slow".into()).is_retryable());
    }
}
