//! Router configuration
//!
//! Every list route is reachable with and without the trailing slash.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::constants::messages::ROUTE_NOT_FOUND;
use crate::error::{ApiError, ErrorResponse};
use crate::handlers::{health, lists, metrics};
use crate::middleware::{add_security_headers, metrics_middleware, request_logger_middleware};
use crate::models::{ItemResponse, ListCreatedResponse, NewItem};
use crate::services::{DependencyHealth, HealthCheckStatus, HealthStatus};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(title = "Lists API", version = "0.1.0"),
    paths(
        lists::create_list,
        lists::list_items,
        lists::add_item,
        health::health_check,
        metrics::get_prometheus_metrics,
    ),
    components(schemas(
        ItemResponse,
        NewItem,
        ListCreatedResponse,
        ErrorResponse,
        HealthStatus,
        DependencyHealth,
        HealthCheckStatus,
    )),
    tags(
        (name = "lists", description = "To-do lists and their items"),
        (name = "health", description = "Service health"),
        (name = "metrics", description = "Prometheus metrics"),
    )
)]
pub struct ApiDoc;

/// List routes
pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/api/lists", post(lists::create_list))
        .route("/api/lists/", post(lists::create_list))
        .route(
            "/api/lists/{list_id}",
            get(lists::list_items).post(lists::add_item),
        )
        .route(
            "/api/lists/{list_id}/",
            get(lists::list_items).post(lists::add_item),
        )
}

/// Build the application router with middleware and state attached.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::get_prometheus_metrics))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(list_routes())
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(metrics_middleware))
                .layer(from_fn(add_security_headers))
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound(ROUTE_NOT_FOUND.to_string())
}
