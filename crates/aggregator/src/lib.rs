//! Air Quality Aggregation
//!
//! Turns an hourly series into per-hour records or per-day averages.

mod daily;
mod flat;
mod statistics;

pub use daily::{aggregate_daily, date_key, group_by_date, DailyAggregate, DayBucket};
pub use flat::{reshape_flat, HourlySample};
pub use statistics::{mean_present, round2};

pub use fetcher::{HourlySeries, SeriesError};
