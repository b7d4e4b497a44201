//! ETL Routes
//!
//! Every call fetches the upstream series again; nothing is cached.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState, QueryDefaults};
use aggregator::{DailyAggregate, HourlySample};
use fetcher::HourlySeries;

/// Coordinate query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(alias = "lon")]
    pub longitude: Option<f64>,
}

impl LocationQuery {
    /// Fill in omitted coordinates from the defaults
    pub fn resolve(&self, defaults: &QueryDefaults) -> (f64, f64) {
        (
            self.latitude.unwrap_or(defaults.latitude),
            self.longitude.unwrap_or(defaults.longitude),
        )
    }
}

/// Response for the load endpoint
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub status: &'static str,
    pub rows_inserted: usize,
}

async fn fetch_series(state: &AppState, params: &LocationQuery) -> Result<HourlySeries, ApiError> {
    let (latitude, longitude) = params.resolve(&state.defaults);
    Ok(state.client.fetch(latitude, longitude).await?)
}

/// Raw hourly series
pub async fn extract(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<Json<HourlySeries>, ApiError> {
    Ok(Json(fetch_series(&state, &params).await?))
}

/// One record per hour
pub async fn transform(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<Json<Vec<HourlySample>>, ApiError> {
    let series = fetch_series(&state, &params).await?;
    Ok(Json(aggregator::reshape_flat(&series)?))
}

/// Daily averages, not persisted
pub async fn aggregate_daily(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<Json<Vec<DailyAggregate>>, ApiError> {
    let series = fetch_series(&state, &params).await?;
    Ok(Json(aggregator::aggregate_daily(&series)?))
}

/// Fetch, aggregate and upsert into the store
pub async fn load(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LocationQuery>,
) -> Result<Json<LoadResponse>, ApiError> {
    let series = fetch_series(&state, &params).await?;
    let daily = aggregator::aggregate_daily(&series)?;
    let rows_inserted = state.repository.upsert_many(&daily).await?;

    metrics::counter!("air_quality_rows_loaded_total").increment(rows_inserted as u64);
    info!(rows = rows_inserted, "Loaded daily aggregates");

    Ok(Json(LoadResponse {
        status: "success",
        rows_inserted,
    }))
}
