//! Open-Meteo Air Quality Client
//!
//! One GET per call, no caching and no retry. Failures are returned to the
//! caller as [`FetchError`].

use crate::error::FetchError;
use crate::series::HourlySeries;
use crate::variables;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Default upstream endpoint
pub const DEFAULT_BASE_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

/// Longest slice of an error body kept in [`FetchError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Top-level upstream response; everything besides `hourly` is ignored
#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: HourlySeries,
}

/// Client for the hourly air-quality endpoint
#[derive(Debug, Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
}

impl AirQualityClient {
    /// Create a client for the given endpoint URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        info!("Creating air-quality client for {}", base_url);

        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Endpoint this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the hourly series for a coordinate.
    ///
    /// Coordinates are forwarded without range checks. The returned series is
    /// guaranteed to be index-aligned.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<HourlySeries, FetchError> {
        debug!(latitude, longitude, "Fetching hourly air quality");
        metrics::counter!("air_quality_upstream_requests_total").increment(1);

        let result = self.request(latitude, longitude).await;
        if let Err(e) = &result {
            metrics::counter!("air_quality_upstream_failures_total").increment(1);
            warn!(latitude, longitude, error = %e, "Air quality fetch failed");
        }
        result
    }

    async fn request(&self, latitude: f64, longitude: f64) -> Result<HourlySeries, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", variables::HOURLY.to_string()),
                ("timezone", "UTC".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: AirQualityResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))?;

        parsed.hourly.validate()?;
        debug!(samples = parsed.hourly.len(), "Received hourly series");

        Ok(parsed.hourly)
    }
}

impl Default for AirQualityClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> AirQualityClient {
        AirQualityClient::new(format!("{}/v1/air-quality", server.uri()))
    }

    #[tokio::test]
    async fn test_fetch_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/air-quality"))
            .and(query_param("latitude", "48.8566"))
            .and(query_param("longitude", "2.3522"))
            .and(query_param("hourly", "pm2_5,pm10,nitrogen_dioxide"))
            .and(query_param("timezone", "UTC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "latitude": 48.86,
                "longitude": 2.35,
                "hourly_units": { "time": "iso8601" },
                "hourly": {
                    "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                    "pm2_5": [10.0, null],
                    "pm10": [5.0, 6.0],
                    "nitrogen_dioxide": [1.0, 2.0]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let series = client_for(&server).await.fetch(48.8566, 2.3522).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.pm2_5, vec![Some(10.0), None]);
        assert_eq!(series.time[1], "2024-01-01T01:00");
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Latitude must be in range"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch(123.0, 2.0).await.unwrap_err();
        match err {
            FetchError::Status { status, ref body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Latitude"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_missing_metric_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hourly": { "time": ["2024-01-01T00:00"], "pm2_5": [1.0], "pm10": [1.0] }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
        assert!(!err.is_upstream());
    }

    #[tokio::test]
    async fn test_misaligned_arrays_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hourly": {
                    "time": ["2024-01-01T00:00", "2024-01-01T01:00"],
                    "pm2_5": [1.0, 2.0],
                    "pm10": [1.0],
                    "nitrogen_dioxide": [1.0, 2.0]
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch(0.0, 0.0).await.unwrap_err();
        match err {
            FetchError::MalformedPayload(msg) => assert!(msg.contains("pm10")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = AirQualityClient::new("http://127.0.0.1:1/v1/air-quality");
        assert_eq!(client.base_url(), "http://127.0.0.1:1/v1/air-quality");
        let err = client.fetch(0.0, 0.0).await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
