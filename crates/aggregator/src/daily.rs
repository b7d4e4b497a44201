//! Daily Aggregation
//!
//! Groups hourly samples by calendar date and averages each metric.

use crate::statistics::{mean_present, round2};
use fetcher::{HourlySeries, SeriesError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Per-metric daily means, keyed by date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    /// ISO-8601 date, e.g. `2024-01-01`
    pub date: String,
    pub pm2_5_avg: Option<f64>,
    pub pm10_avg: Option<f64>,
    pub nitrogen_dioxide_avg: Option<f64>,
}

/// Values of one calendar date, in arrival order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayBucket {
    pub date: String,
    pub pm2_5: Vec<Option<f64>>,
    pub pm10: Vec<Option<f64>>,
    pub nitrogen_dioxide: Vec<Option<f64>>,
}

impl DayBucket {
    fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            ..Default::default()
        }
    }

    /// Number of hourly samples that fell on this date
    pub fn len(&self) -> usize {
        self.pm2_5.len()
    }

    /// Whether no sample fell on this date
    pub fn is_empty(&self) -> bool {
        self.pm2_5.is_empty()
    }

    /// Averages rounded to two decimals
    pub fn aggregate(&self) -> DailyAggregate {
        DailyAggregate {
            date: self.date.clone(),
            pm2_5_avg: mean_present(&self.pm2_5).map(round2),
            pm10_avg: mean_present(&self.pm10).map(round2),
            nitrogen_dioxide_avg: mean_present(&self.nitrogen_dioxide).map(round2),
        }
    }
}

/// Date part of a timestamp: everything before the `T` separator
pub fn date_key(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Group samples by date. Buckets come out in order of first occurrence.
pub fn group_by_date(series: &HourlySeries) -> Result<Vec<DayBucket>, SeriesError> {
    series.validate()?;

    let mut buckets: Vec<DayBucket> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (i, timestamp) in series.time.iter().enumerate() {
        let key = date_key(timestamp);
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(DayBucket::new(key));
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.pm2_5.push(series.pm2_5[i]);
        bucket.pm10.push(series.pm10[i]);
        bucket.nitrogen_dioxide.push(series.nitrogen_dioxide[i]);
    }

    Ok(buckets)
}

/// Compute one [`DailyAggregate`] per distinct date, in order of first occurrence
pub fn aggregate_daily(series: &HourlySeries) -> Result<Vec<DailyAggregate>, SeriesError> {
    let buckets = group_by_date(series)?;
    debug!(
        samples = series.len(),
        days = buckets.len(),
        "Aggregated hourly series"
    );

    Ok(buckets.iter().map(DayBucket::aggregate).collect())
}
