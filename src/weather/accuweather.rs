//! HTTP client for the AccuWeather data service
//!
//! Single-attempt requests: no retries, no rate limiting, no caching. The API
//! key travels as a query parameter and is kept out of every log line.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::WeatherApi;
use crate::config::ProviderConfig;
use crate::error::WeatherError;
use crate::models::{CityQuery, LocationKey};

const USER_AGENT: &str = concat!("route-weather/", env!("CARGO_PKG_VERSION"));
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Map a response status to the pipeline's failure kinds.
///
/// `None` for success. Credential problems (401, 403), throttling (429) and
/// server-side failures (5xx) make the provider unavailable; anything else
/// means the provider had nothing usable for this request.
#[must_use]
pub fn classify_status(status: StatusCode) -> Option<WeatherError> {
    if status.is_success() {
        None
    } else if matches!(
        status,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) || status.is_server_error()
    {
        Some(WeatherError::unavailable(Some(status.as_u16())))
    } else {
        Some(WeatherError::NoData)
    }
}

/// AccuWeather API client
#[derive(Debug, Clone)]
pub struct AccuWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AccuWeatherClient {
    /// Create a client from provider settings; the API key is mandatory
    pub fn new(config: &ProviderConfig) -> Result<Self, WeatherError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| WeatherError::config("Missing provider API key"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// GET `path` (which already carries its own query string) and decode JSON
    #[instrument(skip(self, path))]
    async fn get_json(&self, endpoint: &'static str, path: String) -> Result<Value, WeatherError> {
        let separator = if path.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}{}apikey={}",
            self.base_url,
            path,
            separator,
            urlencoding::encode(&self.api_key)
        );

        let start_time = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error calling {}: {}", endpoint, e.without_url());
            WeatherError::unavailable(None)
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start_time.elapsed().as_secs_f64()
        );

        if let Some(err) = classify_status(status) {
            if err.is_provider_failure() {
                error!("Provider rejected {} request with {}", endpoint, status);
            } else {
                warn!("Provider returned {} for {}", status, endpoint);
            }
            return Err(err);
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                warn!("Failed to parse {} response: {}", endpoint, e.without_url());
                WeatherError::NoData
            } else {
                warn!("Failed to read {} response: {}", endpoint, e.without_url());
                WeatherError::unavailable(None)
            }
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Successful {} request in {:.3}s",
            endpoint,
            total_duration.as_secs_f64()
        );
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow provider response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherApi for AccuWeatherClient {
    async fn city_search(&self, query: &CityQuery) -> Result<Value, WeatherError> {
        let path = format!(
            "/locations/v1/cities/search?q={}",
            urlencoding::encode(query.as_str())
        );
        self.get_json("city_search", path).await
    }

    async fn current_conditions(&self, key: &LocationKey) -> Result<Value, WeatherError> {
        let path = format!(
            "/currentconditions/v1/{}?details=true",
            urlencoding::encode(key.as_str())
        );
        self.get_json("current_conditions", path).await
    }

    async fn daily_forecast(&self, key: &LocationKey) -> Result<Value, WeatherError> {
        let path = format!(
            "/forecasts/v1/daily/5day/{}?metric=true&details=true",
            urlencoding::encode(key.as_str())
        );
        self.get_json("daily_forecast", path).await
    }
}
