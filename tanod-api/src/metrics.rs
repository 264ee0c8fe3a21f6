//! Prometheus Metrics
//!
//! # Metrics
//!
//! ## Counters
//! - `tanod_location_reports_total` - Location reports by result
//!   (`accepted`, `rejected`, `failed`)
//! - `tanod_registry_events_total` - Registry events fanned out, by kind
//! - `tanod_viewer_drops_total` - Viewers removed after a failed delivery
//! - `tanod_stale_deactivations_total` - Officers expired by the reaper
//! - `tanod_ended_patrols_total` - Officers reverted after their patrol schedule ended
//! - `tanod_sweep_failures_total` - Staleness sweeps that errored
//!
//! ## Gauges
//! - `tanod_viewers_connected` - Viewers currently subscribed
//!
//! Recording is a no-op until a recorder is installed, so every call site
//! records unconditionally.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder when enabled.
///
/// Call once at startup. Returns the handle used to render `/metrics`.
pub fn init_metrics(enabled: bool) -> Result<Option<PrometheusHandle>, String> {
    if !enabled {
        tracing::info!("Metrics disabled");
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install metrics recorder: {}", e))?;

    tracing::info!("Metrics initialized");
    Ok(Some(handle))
}

/// Outcome label for a location report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportResult {
    Accepted,
    Rejected,
    Failed,
}

impl ReportResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

pub fn record_location_report(result: ReportResult) {
    counter!("tanod_location_reports_total", "result" => result.as_str()).increment(1);
}

pub fn record_registry_event(kind: &'static str) {
    counter!("tanod_registry_events_total", "kind" => kind).increment(1);
}

pub fn set_viewers_connected(count: usize) {
    gauge!("tanod_viewers_connected").set(count as f64);
}

pub fn record_viewer_drop() {
    counter!("tanod_viewer_drops_total").increment(1);
}

pub fn record_stale_deactivations(count: usize) {
    counter!("tanod_stale_deactivations_total").increment(count as u64);
}

pub fn record_ended_patrols(count: usize) {
    counter!("tanod_ended_patrols_total").increment(count as u64);
}

pub fn record_sweep_failure() {
    counter!("tanod_sweep_failures_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_metrics_install_nothing() {
        assert!(init_metrics(false).unwrap().is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_location_report(ReportResult::Accepted);
        record_registry_event("upserted");
        set_viewers_connected(3);
        record_viewer_drop();
        record_stale_deactivations(2);
        record_sweep_failure();
        assert_eq!(ReportResult::Rejected.as_str(), "rejected");
    }
}
