// Business logic services
// Item validation, list orchestration, health checks.

pub mod health_check;
pub mod list_service;

pub use health_check::{DependencyHealth, HealthCheckStatus, HealthChecker, HealthStatus};
pub use list_service::ListService;
