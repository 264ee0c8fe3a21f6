//! Tracking Constants
//!
//! Centralized defaults for the tracking core. Deployment overrides live in
//! the API configuration; everything here is the fallback.

// ============================================================================
// Channel
// ============================================================================

/// Logical channel viewers join to receive live officer positions
pub const TRACKING_CHANNEL: &str = "tracking";

/// Capacity of the registry event channel feeding the fan-out hub
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Default outbound queue capacity per connected viewer
pub const DEFAULT_VIEWER_QUEUE_CAPACITY: usize = 256;

// ============================================================================
// Staleness
// ============================================================================

/// Default age after which an unrefreshed location is treated as offline (5 minutes)
pub const DEFAULT_STALE_AFTER_SECS: u64 = 300;

/// Default interval between staleness sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;

/// Default upper bound for the sweep retry backoff
pub const DEFAULT_SWEEP_MAX_BACKOFF_SECS: u64 = 300;

// ============================================================================
// Display
// ============================================================================

/// Marker color used when an officer is not on an active patrol
pub const DEFAULT_NEUTRAL_COLOR: &str = "#808080";

// ============================================================================
// Geography
// ============================================================================

/// Latitude bounds in degrees
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bounds in degrees
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness_defaults() {
        assert!(DEFAULT_SWEEP_INTERVAL_SECS < DEFAULT_STALE_AFTER_SECS);
        assert!(DEFAULT_SWEEP_MAX_BACKOFF_SECS >= DEFAULT_SWEEP_INTERVAL_SECS);
    }

    #[test]
    fn test_neutral_color_is_hex() {
        assert!(DEFAULT_NEUTRAL_COLOR.starts_with('#'));
        assert_eq!(DEFAULT_NEUTRAL_COLOR.len(), 7);
    }
}
