//! Error types and handling for the route weather pipeline

use thiserror::Error;

/// Main error type for resolving, fetching and extracting weather data
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Transport failure or a service-level status (401, 403, 429, 5xx)
    #[error("Weather provider unavailable{}", status_suffix(.status))]
    ProviderUnavailable { status: Option<u16> },

    /// City search succeeded but produced no usable match
    #[error("City not found: {city}")]
    CityNotFound { city: String },

    /// Provider answered without any usable weather data
    #[error("No weather data returned by provider")]
    NoData,

    /// Provider payload lacks a field required by the assessment rules
    #[error("Malformed provider payload: missing or invalid `{field}`")]
    MalformedPayload { field: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl WeatherError {
    /// Create a provider-unavailable error, optionally carrying the HTTP status
    #[must_use]
    pub fn unavailable(status: Option<u16>) -> Self {
        Self::ProviderUnavailable { status }
    }

    /// Create a new city-not-found error
    pub fn city_not_found<S: Into<String>>(city: S) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    /// Create a new malformed-payload error naming the offending field path
    pub fn malformed<S: Into<String>>(field: S) -> Self {
        Self::MalformedPayload {
            field: field.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the failure lies with the provider (credentials, outage, network)
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::ProviderUnavailable { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::ProviderUnavailable { .. } => {
                "Could not reach the weather service. Please try again later.".to_string()
            }
            WeatherError::CityNotFound { city } => {
                format!("Could not find \"{city}\". Please check the city name.")
            }
            WeatherError::NoData => {
                "No weather data for this city. Please check the city name.".to_string()
            }
            WeatherError::Validation { message } => format!("Invalid input: {message}"),
            WeatherError::MalformedPayload { .. } => {
                "Something went wrong while reading the weather data.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}
