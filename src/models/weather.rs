//! Normalized weather metrics and display methods

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which provider payload shape a metrics record is extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Instantaneous current-conditions snapshot
    Current,
    /// One entry of the daily forecast list
    ForecastDay,
}

/// Fixed metric set shared by both payload modes.
///
/// Fields a mode does not provide are `None` (unknown) and are skipped by the
/// assessment rules that would check them; `has_precipitation` defaults to
/// `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherMetrics {
    /// Temperature in Celsius (daily maximum for forecasts)
    pub temperature: f64,
    /// Relative humidity in percent, current conditions only
    pub humidity: Option<u8>,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Visibility in kilometers, current conditions only
    pub visibility: Option<f64>,
    /// Precipitation probability in percent, forecast only
    pub precipitation_probability: Option<u8>,
    /// Whether it is precipitating right now, current conditions only
    pub has_precipitation: bool,
}

impl WeatherMetrics {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{:.1} °C", self.temperature)
    }

    /// Format wind speed with unit
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{:.1} km/h", self.wind_speed)
    }

    #[must_use]
    pub fn format_humidity(&self) -> String {
        self.humidity
            .map_or_else(|| "unknown".to_string(), |h| format!("{h}%"))
    }

    #[must_use]
    pub fn format_visibility(&self) -> String {
        self.visibility
            .map_or_else(|| "unknown".to_string(), |v| format!("{v:.1} km"))
    }

    /// Format precipitation probability; an absent value reads as 0%
    #[must_use]
    pub fn format_precipitation(&self) -> String {
        format!("{}%", self.precipitation_probability.unwrap_or(0))
    }
}

/// Metrics for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    pub date: NaiveDate,
    pub metrics: WeatherMetrics,
}
