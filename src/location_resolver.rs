//! Location Resolution Module
//!
//! Resolves free-text city names into provider location keys through the
//! provider's city search. The first match wins; ambiguous names such as
//! "Springfield" are not disambiguated.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::WeatherError;
use crate::models::{CityQuery, GeoPosition, LocationKey, ResolvedCity};
use crate::weather::WeatherApi;

/// Service for resolving city names
#[derive(Clone)]
pub struct LocationResolver {
    api: Arc<dyn WeatherApi>,
}

impl LocationResolver {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>) -> Self {
        Self { api }
    }

    /// Resolve a city name to its provider location key
    pub async fn resolve(&self, city: &CityQuery) -> Result<LocationKey, WeatherError> {
        Ok(self.locate(city).await?.key)
    }

    /// Resolve a city name to its key, display name and position
    #[instrument(skip_all, fields(city = %city))]
    pub async fn locate(&self, city: &CityQuery) -> Result<ResolvedCity, WeatherError> {
        debug!("Searching provider for city");

        let results = match self.api.city_search(city).await {
            Ok(results) => results,
            Err(WeatherError::NoData) => return Err(WeatherError::city_not_found(city.as_str())),
            Err(err) => return Err(err),
        };

        let resolved = first_match(city, &results)
            .ok_or_else(|| WeatherError::city_not_found(city.as_str()))?;

        debug!(
            "Resolved '{}' to key {} ({})",
            city,
            resolved.key,
            resolved
                .position
                .map_or_else(|| "no position".to_string(), |p| p.format_coordinates())
        );

        Ok(resolved)
    }
}

/// Build a [`ResolvedCity`] from the first search record, if it has a key
fn first_match(city: &CityQuery, results: &Value) -> Option<ResolvedCity> {
    let first = results.as_array()?.first()?;

    let key = match first.get("Key")? {
        Value::String(key) if !key.is_empty() => key.clone(),
        Value::Number(key) => key.to_string(),
        _ => return None,
    };

    let name = first
        .get("LocalizedName")
        .and_then(Value::as_str)
        .unwrap_or(city.as_str())
        .to_string();

    let position = first.get("GeoPosition").and_then(|geo| {
        Some(GeoPosition {
            latitude: geo.get("Latitude")?.as_f64()?,
            longitude: geo.get("Longitude")?.as_f64()?,
        })
    });

    Some(ResolvedCity {
        query: city.clone(),
        key: LocationKey::new(key),
        name,
        position,
    })
}
