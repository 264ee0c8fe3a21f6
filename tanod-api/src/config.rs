//! API server configuration
//!
//! # Environment
//!
//! - `TANOD_HOST` (default `0.0.0.0`), `TANOD_PORT` (default `3000`)
//! - `TANOD_ENABLE_CORS` (default `true`)
//! - `TANOD_STALE_AFTER_SECS` (default `300`)
//! - `TANOD_SWEEP_INTERVAL_SECS` (default `30`)
//! - `TANOD_SWEEP_MAX_BACKOFF_SECS` (default `300`)
//! - `TANOD_NEUTRAL_COLOR` (default `#808080`)
//! - `TANOD_DATA_DIR`: sled directory for location records; unset keeps them in memory
//! - `TANOD_VIEWER_QUEUE`: per-viewer outbound queue capacity (default `256`)
//! - `TANOD_METRICS_ENABLED` (default `false`)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tanod_core::constants::{
    DEFAULT_NEUTRAL_COLOR, DEFAULT_STALE_AFTER_SECS, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_SWEEP_MAX_BACKOFF_SECS, DEFAULT_VIEWER_QUEUE_CAPACITY,
};

use crate::error::{ApiError, ApiResult};
use crate::services::ReaperConfig;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Age after which an unrefreshed location is deactivated
    pub stale_after_secs: u64,
    pub sweep_interval_secs: u64,
    pub sweep_max_backoff_secs: u64,
    pub neutral_color: String,
    pub data_dir: Option<PathBuf>,
    pub viewer_queue: usize,
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            sweep_max_backoff_secs: DEFAULT_SWEEP_MAX_BACKOFF_SECS,
            neutral_color: DEFAULT_NEUTRAL_COLOR.to_string(),
            data_dir: None,
            viewer_queue: DEFAULT_VIEWER_QUEUE_CAPACITY,
            metrics_enabled: false,
        }
    }
}

impl ApiConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        fn parse_with<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(default)
        };

        Self {
            host: lookup("TANOD_HOST").unwrap_or(defaults.host),
            port: parse_with(&lookup, "TANOD_PORT").unwrap_or(defaults.port),
            enable_cors: flag("TANOD_ENABLE_CORS", defaults.enable_cors),
            stale_after_secs: parse_with(&lookup, "TANOD_STALE_AFTER_SECS").unwrap_or(defaults.stale_after_secs),
            sweep_interval_secs: parse_with(&lookup, "TANOD_SWEEP_INTERVAL_SECS")
                .unwrap_or(defaults.sweep_interval_secs),
            sweep_max_backoff_secs: parse_with(&lookup, "TANOD_SWEEP_MAX_BACKOFF_SECS")
                .unwrap_or(defaults.sweep_max_backoff_secs),
            neutral_color: lookup("TANOD_NEUTRAL_COLOR").unwrap_or(defaults.neutral_color),
            data_dir: lookup("TANOD_DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            viewer_queue: parse_with(&lookup, "TANOD_VIEWER_QUEUE").unwrap_or(defaults.viewer_queue),
            metrics_enabled: flag("TANOD_METRICS_ENABLED", defaults.metrics_enabled),
        }
    }

    /// Address to bind
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ApiError::Internal(format!("invalid listen address: {}", e)))
    }

    pub fn reaper_config(&self) -> ReaperConfig {
        ReaperConfig {
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            max_backoff: Duration::from_secs(self.sweep_max_backoff_secs.max(1)),
            stale_after: chrono::Duration::seconds(self.stale_after_secs as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ApiConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert!(config.enable_cors);
        assert_eq!(config.stale_after_secs, 300);
        assert_eq!(config.sweep_interval_secs, 30);
        assert_eq!(config.neutral_color, "#808080");
        assert!(config.data_dir.is_none());
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TANOD_PORT", "8080"),
            ("TANOD_ENABLE_CORS", "false"),
            ("TANOD_STALE_AFTER_SECS", "120"),
            ("TANOD_DATA_DIR", "/var/lib/tanod"),
            ("TANOD_VIEWER_QUEUE", "16"),
            ("TANOD_METRICS_ENABLED", "1"),
        ]);
        assert_eq!(config.port, 8080);
        assert!(!config.enable_cors);
        assert_eq!(config.stale_after_secs, 120);
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/tanod")));
        assert_eq!(config.viewer_queue, 16);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let config = config_from(&[("TANOD_PORT", "not-a-port"), ("TANOD_DATA_DIR", " ")]);
        assert_eq!(config.port, 3000);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_reaper_config() {
        let config = config_from(&[("TANOD_SWEEP_INTERVAL_SECS", "0")]);
        let reaper = config.reaper_config();
        assert_eq!(reaper.sweep_interval, Duration::from_secs(1));
        assert_eq!(reaper.stale_after, chrono::Duration::minutes(5));
    }
}
