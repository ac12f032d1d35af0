//! Weather provider access
//!
//! [`WeatherApi`] is the raw endpoint seam (one implementation per provider,
//! see [`accuweather`]); [`WeatherFetcher`] turns endpoint bodies into the
//! payloads the extractor works on.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::WeatherError;
use crate::models::{CityQuery, LocationKey};

pub mod accuweather;
#[cfg(test)]
pub(crate) mod stub;

pub use accuweather::AccuWeatherClient;

/// Untyped provider record, navigated by the metric extractor
pub type RawPayload = Value;

/// Number of days the provider's daily forecast endpoint covers
pub const FORECAST_WINDOW_DAYS: usize = 5;

/// Raw provider endpoints.
///
/// Implementations make a single attempt per call. Transport failures and
/// service-level statuses map to [`WeatherError::ProviderUnavailable`]; any
/// other unusable response maps to [`WeatherError::NoData`].
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Free-text city search, returning the provider's list of location records
    async fn city_search(&self, query: &CityQuery) -> Result<Value, WeatherError>;

    /// Current conditions for a location key
    async fn current_conditions(&self, key: &LocationKey) -> Result<Value, WeatherError>;

    /// Daily forecast for a location key, covering [`FORECAST_WINDOW_DAYS`] days
    async fn daily_forecast(&self, key: &LocationKey) -> Result<Value, WeatherError>;
}

/// Ordered daily forecast entries plus the provider's headline link
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPayload {
    pub days: Vec<RawPayload>,
    pub link: Option<String>,
}

/// Retrieves current-conditions and forecast payloads for resolved locations
#[derive(Clone)]
pub struct WeatherFetcher {
    api: Arc<dyn WeatherApi>,
}

impl WeatherFetcher {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    /// Fetch the current-conditions record for a location
    #[instrument(skip_all, fields(key = %key))]
    pub async fn fetch_current(&self, key: &LocationKey) -> Result<RawPayload, WeatherError> {
        let body = self.api.current_conditions(key).await?;

        match body {
            Value::Array(records) => records.into_iter().next().ok_or(WeatherError::NoData),
            _ => {
                debug!("Current conditions body is not a list");
                Err(WeatherError::NoData)
            }
        }
    }

    /// Fetch up to `days` daily forecast records for a location.
    ///
    /// Requests beyond the provider window are truncated to
    /// [`FORECAST_WINDOW_DAYS`] entries rather than rejected.
    #[instrument(skip_all, fields(key = %key, days = days))]
    pub async fn fetch_forecast(
        &self,
        key: &LocationKey,
        days: usize,
    ) -> Result<ForecastPayload, WeatherError> {
        let body = self.api.daily_forecast(key).await?;

        let daily = match body.get("DailyForecasts").and_then(Value::as_array) {
            Some(daily) if !daily.is_empty() => daily,
            _ => {
                debug!("Forecast body has no daily entries");
                return Err(WeatherError::NoData);
            }
        };

        let wanted = days.min(FORECAST_WINDOW_DAYS);
        let link = body
            .pointer("/Headline/Link")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ForecastPayload {
            days: daily.iter().take(wanted).cloned().collect(),
            link,
        })
    }
}
