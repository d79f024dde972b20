use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::error::WeatherError;
use super::parser::parse_current_observation;
use super::response::WttrResponse;
use super::{WeatherObservation, WeatherProvider};

/// Bounded per-request timeout so a slow provider cannot stall pricing.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Public wttr.in endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://wttr.in";

/// Fixed reference coordinate for condition lookups (the service city).
pub const REFERENCE_LATITUDE: f64 = 53.1428;
pub const REFERENCE_LONGITUDE: f64 = 90.4167;

/// Thin HTTP client for wttr.in-style JSON weather observations.
#[derive(Debug, Clone)]
pub struct WttrClient {
    client: Client,
    endpoint: String,
    latitude: f64,
    longitude: f64,
}

impl WttrClient {
    /// Create a client for the given endpoint (e.g. `https://wttr.in`).
    pub fn new(endpoint: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build weather client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            latitude: REFERENCE_LATITUDE,
            longitude: REFERENCE_LONGITUDE,
        }
    }

    /// Override the reference coordinate.
    pub fn with_coordinate(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    async fn fetch_current(&self) -> Result<WeatherObservation, WeatherError> {
        let base = format!("{}/{:.4},{:.4}", self.endpoint, self.latitude, self.longitude);
        let mut url = Url::parse(&base)
            .map_err(|err| WeatherError::Payload(format!("failed to build weather URL: {err}")))?;
        url.query_pairs_mut().append_pair("format", "j1");

        let response = self.client.get(url).send().await.map_err(WeatherError::Http)?;
        let parsed: WttrResponse = response.json().await.map_err(WeatherError::Json)?;
        parse_current_observation(parsed)
    }
}

impl Default for WttrClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl WeatherProvider for WttrClient {
    async fn current_observation(&self) -> Result<WeatherObservation, WeatherError> {
        self.fetch_current().await
    }
}
