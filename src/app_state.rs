//! Application state shared across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::services::{HealthChecker, ListService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// List and item operations
    pub list_service: ListService,
    /// Health check service
    pub health_checker: HealthChecker,
    /// Prometheus render handle; `None` when no recorder is installed (tests)
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: Config, list_service: ListService, health_checker: HealthChecker) -> Self {
        Self {
            config,
            list_service,
            health_checker,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}

impl axum::extract::FromRef<AppState> for HealthChecker {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.health_checker.clone()
    }
}
