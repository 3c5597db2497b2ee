use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use utoipa::ToSchema;

use crate::database::ListStore;

/// Dependency health information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DependencyHealth {
    pub name: String,
    pub status: HealthCheckStatus,
    pub response_time_ms: Option<u64>,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckStatus {
    Healthy,
    Unhealthy,
}

/// Overall service health
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: HealthCheckStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub environment: String,
    pub uptime_seconds: u64,
    pub dependencies: Vec<DependencyHealth>,
}

/// Health checker service
#[derive(Clone)]
pub struct HealthChecker {
    start_time: Arc<Instant>,
    store: Arc<dyn ListStore>,
    environment: String,
}

impl HealthChecker {
    pub fn new(store: Arc<dyn ListStore>, environment: impl Into<String>) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            store,
            environment: environment.into(),
        }
    }

    pub fn get_uptime(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    async fn check_store(&self) -> DependencyHealth {
        let start = Instant::now();
        let result = self.store.ping().await;
        let elapsed = start.elapsed().as_millis() as u64;

        let (status, error_message) = match result {
            Ok(()) => (HealthCheckStatus::Healthy, None),
            Err(e) => {
                warn!("Store health check failed: {}", e);
                (HealthCheckStatus::Unhealthy, Some(e.to_string()))
            }
        };

        DependencyHealth {
            name: self.store.backend_name().to_string(),
            status,
            response_time_ms: Some(elapsed),
            last_check: Utc::now(),
            error_message,
        }
    }

    pub async fn check(&self) -> HealthStatus {
        let dependencies = vec![self.check_store().await];
        let status = if dependencies
            .iter()
            .all(|d| d.status == HealthCheckStatus::Healthy)
        {
            HealthCheckStatus::Healthy
        } else {
            HealthCheckStatus::Unhealthy
        };

        HealthStatus {
            status,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: self.environment.clone(),
            uptime_seconds: self.get_uptime(),
            dependencies,
        }
    }
}
