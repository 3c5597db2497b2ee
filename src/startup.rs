//! Application startup and initialization logic.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::{Config, LogFormat, StorageBackend};
use crate::database::{self, ListStore, MemoryListStore, PgListStore};
use crate::services::{HealthChecker, ListService};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `LOG_LEVEL`; the fallback keeps this crate and
/// tower-http at debug.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},lists_api=debug,tower_http=debug", config.log_level)))
        .unwrap_or_else(|_| EnvFilter::new("lists_api=debug,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

/// Connect the configured store and run migrations when it is PostgreSQL.
pub async fn setup_store(config: &Config) -> Result<Arc<dyn ListStore>> {
    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres storage"))?;

            let db_pool = database::setup_database(database_url, config.max_connections).await?;
            info!("✅ PostgreSQL connection established");

            database::run_migrations(&db_pool).await?;
            info!("✅ Database migrations completed");

            Ok(Arc::new(PgListStore::new(db_pool)))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("⚠️ In-memory storage in production: data is lost on restart");
            }
            info!("✅ In-memory store initialized");
            Ok(Arc::new(MemoryListStore::new()))
        }
    }
}

/// Build the AppState around an already connected store.
pub fn build_state(config: &Config, store: Arc<dyn ListStore>) -> AppState {
    let list_service = ListService::new(store.clone());
    let health_checker = HealthChecker::new(store, config.environment.clone());
    AppState::new(config.clone(), list_service, health_checker)
}

/// Initialize application services and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    info!("🚀 Starting lists API ({})", config.environment);

    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("✅ Prometheus metrics initialized");

    let store = setup_store(config).await?;
    let app_state = build_state(config, store).with_metrics(metrics_handle);

    info!("✅ AppState created successfully");
    Ok(app_state)
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
