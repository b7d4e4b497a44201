//! Air Quality ETL API Server
//!
//! REST API exposing the extract, transform, aggregate and load stages of the
//! pipeline plus read endpoints over the stored daily aggregates.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod routes;

pub use crate::config::{AppConfig, QueryDefaults};
pub use crate::error::ApiError;

use fetcher::AirQualityClient;
use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Daily aggregate store
    pub repository: Repository,
    /// Upstream air-quality API
    pub client: AirQualityClient,
    /// Fallbacks for omitted query parameters
    pub defaults: QueryDefaults,
    /// Prometheus renderer, present when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Repository, client: AirQualityClient, defaults: QueryDefaults) -> Self {
        Self {
            repository,
            client,
            defaults,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/extract", get(routes::etl::extract))
        .route("/transform", get(routes::etl::transform))
        .route("/aggregate-daily", get(routes::etl::aggregate_daily))
        .route("/load", post(routes::etl::load))
        .route("/air-quality/daily", get(routes::air_quality::get_daily))
        .route("/air-quality/today", get(routes::air_quality::get_today))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness check
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Initialize logging at the given max level (falls back to INFO)
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let repository = Repository::open(&config.database.path).await?;
    let client = AirQualityClient::new(config.upstream.base_url.clone());
    info!(
        database = %repository.path().display(),
        upstream = %client.base_url(),
        "Pipeline ready"
    );

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    let state = Arc::new(AppState::new(repository, client, config.defaults.clone()).with_metrics(metrics));
    let app = create_router(state);

    let addr = config.server.bind_addr();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
