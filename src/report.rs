//! Presentation of evaluated routes
//!
//! Plain-text reports shared by the bot and the CLI, and the chart series
//! served to the map page.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::models::{CityAssessment, CityReport, DailyMetrics, RouteOutcome};

const PROVIDER_FAILURE_MESSAGE: &str =
    "Could not reach the weather service. Please try again later.";

/// Message for an outcome that could not be evaluated, `None` when resolved
#[must_use]
pub fn failure_message(outcome: &RouteOutcome) -> Option<String> {
    match outcome {
        RouteOutcome::Resolved { .. } => None,
        RouteOutcome::UserError { error } => Some(error.message()),
        RouteOutcome::ProviderError { .. } => Some(PROVIDER_FAILURE_MESSAGE.to_string()),
    }
}

/// Full route report: header with the route end points, then one block per city
#[must_use]
pub fn route_text(start: &str, end: &str, outcome: &RouteOutcome) -> String {
    let reports = match outcome {
        RouteOutcome::Resolved { reports } => reports,
        _ => return failure_message(outcome).unwrap_or_default(),
    };

    let mut text = format!("Route weather forecast:\nStart: {start}\nEnd: {end}\n");
    for report in reports {
        text.push('\n');
        text.push_str(&city_text(report));
    }
    text
}

/// Text block for one city
#[must_use]
pub fn city_text(report: &CityReport) -> String {
    let mut text = String::new();
    match &report.assessment {
        CityAssessment::Current { metrics, verdict } => {
            let _ = writeln!(text, "Current weather in {}:", report.city.name);
            let _ = writeln!(text, "Temperature: {}", metrics.format_temperature());
            let _ = writeln!(text, "Humidity: {}", metrics.format_humidity());
            let _ = writeln!(text, "Wind speed: {}", metrics.format_wind());
            let _ = writeln!(text, "Visibility: {}", metrics.format_visibility());
            let _ = writeln!(text, "{}", verdict.describe());
        }
        CityAssessment::Forecast { days, link } => {
            let _ = writeln!(text, "Forecast for {}:", report.city.name);
            for day in days {
                let metrics = &day.day.metrics;
                let _ = writeln!(text);
                let _ = writeln!(text, "Date: {}", day.day.date.format("%d.%m.%Y"));
                let _ = writeln!(text, "Temperature: {}", metrics.format_temperature());
                let _ = writeln!(text, "Wind speed: {}", metrics.format_wind());
                let _ = writeln!(
                    text,
                    "Precipitation probability: {}",
                    metrics.format_precipitation()
                );
                let _ = writeln!(text, "{}", day.verdict.describe());
            }
            if let Some(link) = link {
                let _ = writeln!(text);
                let _ = writeln!(text, "More details: {link}");
            }
        }
    }
    text
}

/// Column-oriented forecast for charting: one entry per day in every series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub city: String,
    pub days: usize,
    pub dates: Vec<String>,
    pub temperature: Vec<f64>,
    pub wind_speed: Vec<f64>,
    /// Missing probabilities chart as 0
    pub precipitation: Vec<u8>,
}

impl ForecastSeries {
    #[must_use]
    pub fn from_days(city: impl Into<String>, days: &[DailyMetrics]) -> Self {
        Self {
            city: city.into(),
            days: days.len(),
            dates: days
                .iter()
                .map(|day| day.date.format("%Y-%m-%d").to_string())
                .collect(),
            temperature: days.iter().map(|day| day.metrics.temperature).collect(),
            wind_speed: days.iter().map(|day| day.metrics.wind_speed).collect(),
            precipitation: days
                .iter()
                .map(|day| day.metrics.precipitation_probability.unwrap_or(0))
                .collect(),
        }
    }
}
