//! Read Routes over stored daily aggregates

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use storage::StorageError;

use crate::{ApiError, AppState};
use aggregator::DailyAggregate;

/// Query parameters for the daily endpoint
#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// Maximum number of days
    pub limit: Option<usize>,
}

/// Today's date in UTC, the calendar the upstream timestamps use
pub fn today_utc() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Most recent days, oldest first
pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DailyQuery>,
) -> Result<Json<Vec<DailyAggregate>>, ApiError> {
    let limit = params.limit.unwrap_or(state.defaults.daily_limit);
    Ok(Json(state.repository.query_recent_ascending(limit).await?))
}

/// Aggregate stored for today
pub async fn get_today(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DailyAggregate>, ApiError> {
    match state.repository.query_by_date(&today_utc()).await {
        Ok(row) => Ok(Json(row)),
        Err(StorageError::NotFound(_)) => Err(ApiError::NotFound(
            "No air quality data available for today".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}
