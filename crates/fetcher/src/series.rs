//! Hourly series as returned by the upstream API

use crate::error::SeriesError;
use crate::variables;
use serde::{Deserialize, Serialize};

/// Parallel arrays of hourly measurements.
///
/// Every metric array is index-aligned with `time`. Upstream uses `null` for
/// hours without a measurement, so values are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    /// ISO-8601 UTC timestamps, e.g. `2024-01-01T00:00`
    pub time: Vec<String>,
    pub pm2_5: Vec<Option<f64>>,
    pub pm10: Vec<Option<f64>>,
    pub nitrogen_dioxide: Vec<Option<f64>>,
}

impl HourlySeries {
    /// Number of hourly samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series has no samples
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Check that every metric array has one value per timestamp
    pub fn validate(&self) -> Result<(), SeriesError> {
        let expected = self.time.len();
        let metrics = [
            (variables::PM2_5, self.pm2_5.len()),
            (variables::PM10, self.pm10.len()),
            (variables::NITROGEN_DIOXIDE, self.nitrogen_dioxide.len()),
        ];

        for (metric, actual) in metrics {
            if actual != expected {
                return Err(SeriesError::LengthMismatch {
                    metric,
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}
