//! Tanod Database error types

use tanod_core::TrackingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sled::Error> for DbError {
    fn from(e: sled::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<DbError> for TrackingError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => TrackingError::NotFound(what),
            other => TrackingError::Store(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_store_failures() {
        let err: TrackingError = DbError::Storage("disk full".into()).into();
        assert!(err.is_retryable());

        let err: TrackingError = DbError::NotFound("officer A".into()).into();
        assert!(matches!(err, TrackingError::NotFound(_)));
    }
}
