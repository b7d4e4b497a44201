//! Route handlers

pub mod air_quality;
pub mod etl;
