use axum::{extract::State, http::StatusCode, response::Json};

use crate::services::{HealthCheckStatus, HealthChecker, HealthStatus};

/// Service and store health
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Store is unreachable", body = HealthStatus)
    )
)]
pub async fn health_check(
    State(health_checker): State<HealthChecker>,
) -> (StatusCode, Json<HealthStatus>) {
    let health = health_checker.check().await;
    let status = match health.status {
        HealthCheckStatus::Healthy => StatusCode::OK,
        HealthCheckStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}
