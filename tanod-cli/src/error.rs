//! CLI Error Types

use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("API connection error: {message}")]
    ConnectionError { message: String },

    /// Non-success response from the API, with its error code
    #[error("API request failed: {status} {code} - {message}")]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Server error: {message}")]
    ServerError { message: String },
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        CliError::ConnectionError {
            message: message.into(),
        }
    }

    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        CliError::ApiError {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        CliError::ServerError {
            message: message.into(),
        }
    }

    /// Store outages are reported as 503 and are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            CliError::ApiError { status, .. } => *status == 503,
            CliError::ConnectionError { .. } | CliError::HttpError(_) => true,
            _ => false,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument { .. } => 2,
            CliError::ConnectionError { .. } => 3,
            CliError::ApiError { .. } => 4,
            CliError::JsonError(_) => 6,
            CliError::HttpError(_) => 7,
            CliError::ServerError { .. } => 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error() {
        let err = CliError::api(404, "UNKNOWN_OFFICER", "Unknown officer: ghost");
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("UNKNOWN_OFFICER"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_outage_is_retryable() {
        let err = CliError::api(503, "STORE_UNAVAILABLE", "down");
        assert!(err.is_retryable());
        assert!(!CliError::invalid_arg("lat").is_retryable());
    }
}
