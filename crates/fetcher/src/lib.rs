//! Air Quality Fetcher
//!
//! This crate fetches hourly air-quality measurements (PM2.5, PM10 and
//! nitrogen dioxide) for a coordinate from the Open-Meteo air-quality API.

mod client;
mod error;
mod series;

pub use client::{AirQualityClient, DEFAULT_BASE_URL};
pub use error::{FetchError, SeriesError};
pub use series::HourlySeries;

/// Hourly variables requested from the upstream API
pub mod variables {
    /// Fine particulate matter (µg/m³)
    pub const PM2_5: &str = "pm2_5";
    /// Coarse particulate matter (µg/m³)
    pub const PM10: &str = "pm10";
    /// Nitrogen dioxide (µg/m³)
    pub const NITROGEN_DIOXIDE: &str = "nitrogen_dioxide";

    /// Comma separated list for the `hourly` query parameter
    pub const HOURLY: &str = "pm2_5,pm10,nitrogen_dioxide";
}
