//! Application state for the API server

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::fanout::{FanoutHandle, FanoutHub};
use tanod_db::{RegistryService, TrackingStores};

/// API server state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryService>,
    pub stores: TrackingStores,
    pub fanout: FanoutHandle,
    pub config: Arc<ApiConfig>,
    /// Set when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
}

impl AppState {
    /// Open the stores named by the config and start the fan-out hub
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let stores = match &config.data_dir {
            Some(dir) => {
                info!(data_dir = %dir.display(), "Using sled location store");
                TrackingStores::with_sled(dir).map_err(|e| ApiError::Internal(e.to_string()))?
            }
            None => {
                info!("Using in-memory location store");
                TrackingStores::in_memory()
            }
        };
        Ok(Self::with_stores(config, stores))
    }

    /// Build over existing stores. Must be called inside a tokio runtime.
    pub fn with_stores(config: ApiConfig, stores: TrackingStores) -> Self {
        let registry = Arc::new(
            RegistryService::from_stores(&stores).with_neutral_color(config.neutral_color.clone()),
        );
        let fanout = FanoutHub::spawn(registry.clone());

        Self {
            registry,
            stores,
            fanout,
            config: Arc::new(config),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}
