//! Normalizes raw provider payloads into [`WeatherMetrics`]
//!
//! Pure functions over `serde_json::Value`. A field required by a rule that
//! the mode uses must be present and numeric, otherwise the whole record is
//! rejected; optional fields fall back to their documented defaults.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::WeatherError;
use crate::models::{DailyMetrics, ExtractionMode, WeatherMetrics};
use crate::weather::RawPayload;

mod paths {
    pub const CURRENT_TEMPERATURE: &str = "/Temperature/Metric/Value";
    pub const CURRENT_HUMIDITY: &str = "/RelativeHumidity";
    pub const CURRENT_WIND: &str = "/Wind/Speed/Metric/Value";
    pub const CURRENT_VISIBILITY: &str = "/Visibility/Metric/Value";
    pub const CURRENT_HAS_PRECIPITATION: &str = "/HasPrecipitation";
    pub const CURRENT_PRECIPITATION_PROBABILITY: &str = "/PrecipitationProbability";

    pub const DAY_DATE: &str = "/Date";
    pub const DAY_TEMPERATURE: &str = "/Temperature/Maximum/Value";
    pub const DAY_WIND: &str = "/Day/Wind/Speed/Value";
    pub const DAY_PRECIPITATION_PROBABILITY: &str = "/Day/PrecipitationProbability";
}

/// Extract the metric record for `mode` from one provider record
pub fn extract(raw: &RawPayload, mode: ExtractionMode) -> Result<WeatherMetrics, WeatherError> {
    match mode {
        ExtractionMode::Current => extract_current(raw),
        ExtractionMode::ForecastDay => extract_forecast_day(raw),
    }
}

/// Extract a forecast day together with its date
pub fn extract_day(raw: &RawPayload) -> Result<DailyMetrics, WeatherError> {
    let date = raw
        .pointer(paths::DAY_DATE)
        .and_then(Value::as_str)
        .and_then(|date| date.get(..10))
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .ok_or_else(|| WeatherError::malformed(field_name(paths::DAY_DATE)))?;

    Ok(DailyMetrics {
        date,
        metrics: extract_forecast_day(raw)?,
    })
}

fn extract_current(raw: &RawPayload) -> Result<WeatherMetrics, WeatherError> {
    let humidity = required_f64(raw, paths::CURRENT_HUMIDITY)?;

    Ok(WeatherMetrics {
        temperature: required_f64(raw, paths::CURRENT_TEMPERATURE)?,
        humidity: Some(percent(humidity, paths::CURRENT_HUMIDITY)?),
        wind_speed: required_f64(raw, paths::CURRENT_WIND)?,
        visibility: Some(required_f64(raw, paths::CURRENT_VISIBILITY)?),
        precipitation_probability: optional_percent(
            raw,
            paths::CURRENT_PRECIPITATION_PROBABILITY,
        )?,
        has_precipitation: raw
            .pointer(paths::CURRENT_HAS_PRECIPITATION)
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn extract_forecast_day(raw: &RawPayload) -> Result<WeatherMetrics, WeatherError> {
    Ok(WeatherMetrics {
        temperature: required_f64(raw, paths::DAY_TEMPERATURE)?,
        humidity: None,
        wind_speed: required_f64(raw, paths::DAY_WIND)?,
        visibility: None,
        precipitation_probability: optional_percent(raw, paths::DAY_PRECIPITATION_PROBABILITY)?,
        has_precipitation: false,
    })
}

fn required_f64(raw: &Value, path: &str) -> Result<f64, WeatherError> {
    raw.pointer(path)
        .and_then(Value::as_f64)
        .ok_or_else(|| WeatherError::malformed(field_name(path)))
}

fn optional_percent(raw: &Value, path: &str) -> Result<Option<u8>, WeatherError> {
    raw.pointer(path)
        .and_then(Value::as_f64)
        .map(|value| percent(value, path))
        .transpose()
}

/// Whole percentages in `0..=100`; anything else is not a provider value
fn percent(value: f64, path: &str) -> Result<u8, WeatherError> {
    if value.fract() == 0.0 && (0.0..=100.0).contains(&value) {
        Ok(value as u8)
    } else {
        Err(WeatherError::malformed(field_name(path)))
    }
}

/// `/Temperature/Metric/Value` -> `Temperature.Metric.Value`
fn field_name(path: &str) -> String {
    path.trim_start_matches('/').replace('/', ".")
}
