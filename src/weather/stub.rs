//! In-memory [`WeatherApi`] for unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde_json::{Value, json};

use super::WeatherApi;
use crate::error::WeatherError;
use crate::models::{CityQuery, LocationKey};

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Unavailable(Option<u16>),
}

impl Reply {
    fn into_result(self) -> Result<Value, WeatherError> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Unavailable(status) => Err(WeatherError::unavailable(status)),
        }
    }
}

/// Canned responses keyed by query or location key. Unknown cities search to
/// an empty list; unknown keys have no data.
#[derive(Debug, Default)]
pub(crate) struct StubApi {
    searches: HashMap<String, Reply>,
    current: HashMap<String, Reply>,
    forecasts: HashMap<String, Reply>,
    search_calls: AtomicUsize,
}

impl StubApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a city that resolves to `key`, with a geo-position
    pub(crate) fn with_city(mut self, query: &str, key: &str, lat: f64, lon: f64) -> Self {
        self.searches.insert(
            query.to_string(),
            Reply::Json(json!([{
                "Key": key,
                "LocalizedName": query,
                "GeoPosition": {"Latitude": lat, "Longitude": lon}
            }])),
        );
        self
    }

    pub(crate) fn with_search(mut self, query: &str, body: Value) -> Self {
        self.searches.insert(query.to_string(), Reply::Json(body));
        self
    }

    pub(crate) fn with_search_unavailable(mut self, query: &str, status: Option<u16>) -> Self {
        self.searches
            .insert(query.to_string(), Reply::Unavailable(status));
        self
    }

    pub(crate) fn with_current(mut self, key: &str, body: Value) -> Self {
        self.current.insert(key.to_string(), Reply::Json(body));
        self
    }

    pub(crate) fn with_current_unavailable(mut self, key: &str, status: Option<u16>) -> Self {
        self.current.insert(key.to_string(), Reply::Unavailable(status));
        self
    }

    pub(crate) fn with_forecast(mut self, key: &str, body: Value) -> Self {
        self.forecasts.insert(key.to_string(), Reply::Json(body));
        self
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherApi for StubApi {
    async fn city_search(&self, query: &CityQuery) -> Result<Value, WeatherError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches
            .get(query.as_str())
            .cloned()
            .unwrap_or(Reply::Json(json!([])))
            .into_result()
    }

    async fn current_conditions(&self, key: &LocationKey) -> Result<Value, WeatherError> {
        self.current
            .get(key.as_str())
            .cloned()
            .ok_or(WeatherError::NoData)?
            .into_result()
    }

    async fn daily_forecast(&self, key: &LocationKey) -> Result<Value, WeatherError> {
        self.forecasts
            .get(key.as_str())
            .cloned()
            .ok_or(WeatherError::NoData)?
            .into_result()
    }
}

/// A current-conditions record; all values within the favorable ranges
pub(crate) fn current_record(temperature: f64) -> Value {
    json!({
        "LocalObservationDateTime": "2024-05-01T12:00:00+02:00",
        "Temperature": {"Metric": {"Value": temperature, "Unit": "C"}},
        "RelativeHumidity": 45,
        "Wind": {"Speed": {"Metric": {"Value": 14.8, "Unit": "km/h"}}},
        "Visibility": {"Metric": {"Value": 16.1, "Unit": "km"}},
        "HasPrecipitation": false
    })
}

/// A forecast body with `days` consecutive daily entries starting 2024-05-01
pub(crate) fn forecast_body(days: usize) -> Value {
    let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default();
    let daily: Vec<Value> = (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset as i64);
            json!({
                "Date": format!("{}T07:00:00+02:00", date.format("%Y-%m-%d")),
                "Temperature": {
                    "Minimum": {"Value": 9.0, "Unit": "C"},
                    "Maximum": {"Value": 20.0 + offset as f64, "Unit": "C"}
                },
                "Day": {
                    "PrecipitationProbability": 10,
                    "Wind": {"Speed": {"Value": 11.1, "Unit": "km/h"}}
                }
            })
        })
        .collect();

    json!({
        "Headline": {
            "Text": "Pleasant this week",
            "Link": "http://www.accuweather.com/en/fr/paris/623/daily-weather-forecast/623"
        },
        "DailyForecasts": daily
    })
}
