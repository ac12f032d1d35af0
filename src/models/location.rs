//! City queries, provider location keys and resolved positions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Free-text city name as typed by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CityQuery(String);

impl CityQuery {
    /// Create a query from user input; surrounding whitespace is dropped
    pub fn new<S: AsRef<str>>(input: S) -> Result<Self, WeatherError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(WeatherError::validation("City name cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CityQuery {
    type Error = WeatherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CityQuery> for String {
    fn from(query: CityQuery) -> Self {
        query.0
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque provider identifier for a resolved city.
///
/// Keys are resolved per request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationKey(String);

impl LocationKey {
    #[must_use]
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    /// Great-circle distance to another position in kilometers
    #[must_use]
    pub fn distance_km(&self, other: &GeoPosition) -> f64 {
        let from = haversine::Location {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = haversine::Location {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        haversine::distance(from, to, haversine::Units::Kilometers)
    }

    /// Format position as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A city query resolved against the provider's city search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCity {
    /// What the user asked for
    pub query: CityQuery,
    /// Provider key used for the weather endpoints
    pub key: LocationKey,
    /// Provider's display name, falls back to the query
    pub name: String,
    /// Position from the search result, when the provider sent one
    pub position: Option<GeoPosition>,
}
