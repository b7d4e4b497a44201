//! Per-hour view of a series

use fetcher::{HourlySeries, SeriesError};
use serde::{Deserialize, Serialize};

/// One hourly measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    #[serde(rename = "datetime")]
    pub timestamp: String,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub nitrogen_dioxide: Option<f64>,
}

/// Split a series into one record per timestamp, keeping input order
pub fn reshape_flat(series: &HourlySeries) -> Result<Vec<HourlySample>, SeriesError> {
    series.validate()?;

    Ok(series
        .time
        .iter()
        .enumerate()
        .map(|(i, timestamp)| HourlySample {
            timestamp: timestamp.clone(),
            pm2_5: series.pm2_5[i],
            pm10: series.pm10[i],
            nitrogen_dioxide: series.nitrogen_dioxide[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reshape_keeps_order_and_values() {
        let series = HourlySeries {
            time: vec!["2024-01-01T00:00".into(), "2024-01-01T01:00".into()],
            pm2_5: vec![Some(10.0), None],
            pm10: vec![Some(5.0), Some(6.0)],
            nitrogen_dioxide: vec![Some(1.0), Some(2.0)],
        };

        let samples = reshape_flat(&series).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, "2024-01-01T00:00");
        assert_eq!(samples[1].pm2_5, None);
        assert_eq!(samples[1].pm10, Some(6.0));
    }

    #[test]
    fn test_serializes_timestamp_as_datetime() {
        let sample = HourlySample {
            timestamp: "2024-01-01T00:00".into(),
            pm2_5: Some(1.5),
            pm10: None,
            nitrogen_dioxide: Some(3.0),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["datetime"], "2024-01-01T00:00");
        assert!(json["pm10"].is_null());
    }

    #[test]
    fn test_misaligned_series_is_rejected() {
        let series = HourlySeries {
            time: vec!["2024-01-01T00:00".into()],
            pm2_5: vec![],
            pm10: vec![Some(1.0)],
            nitrogen_dioxide: vec![Some(1.0)],
        };
        assert!(reshape_flat(&series).is_err());
    }
}
