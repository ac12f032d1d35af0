//! Verdicts and aggregated route outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DailyMetrics, ResolvedCity, WeatherMetrics};

/// Assessment rule, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Temperature,
    Humidity,
    Wind,
    Visibility,
    Precipitation,
}

impl Rule {
    /// All rules in the order they are checked
    pub const ORDER: [Rule; 5] = [
        Rule::Temperature,
        Rule::Humidity,
        Rule::Wind,
        Rule::Visibility,
        Rule::Precipitation,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Rule::Temperature => "temperature",
            Rule::Humidity => "humidity",
            Rule::Wind => "wind",
            Rule::Visibility => "visibility",
            Rule::Precipitation => "precipitation",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Favorability classification with the first failed rule as reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Favorable,
    Unfavorable(Rule),
}

impl Verdict {
    #[must_use]
    pub fn is_favorable(&self) -> bool {
        matches!(self, Verdict::Favorable)
    }

    /// Human-readable summary used by the web result page and the bot
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Verdict::Favorable => "Favorable conditions".to_string(),
            Verdict::Unfavorable(rule) => format!("Unfavorable conditions - {rule}"),
        }
    }
}

/// Assessed forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAssessment {
    #[serde(flatten)]
    pub day: DailyMetrics,
    pub verdict: Verdict,
}

/// Per-city result of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CityAssessment {
    Current {
        metrics: WeatherMetrics,
        verdict: Verdict,
    },
    Forecast {
        days: Vec<DayAssessment>,
        /// Provider's "more details" link from the forecast headline
        link: Option<String>,
    },
}

impl CityAssessment {
    /// Whether every assessed period is favorable
    #[must_use]
    pub fn is_favorable(&self) -> bool {
        match self {
            CityAssessment::Current { verdict, .. } => verdict.is_favorable(),
            CityAssessment::Forecast { days, .. } => {
                days.iter().all(|day| day.verdict.is_favorable())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub city: ResolvedCity,
    pub assessment: CityAssessment,
}

/// Why a route could not be evaluated, attributable to user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserError {
    /// No city names were supplied, or one was blank
    EmptyQuery,
    /// A route needs at least a start and an end
    TooFewCities,
    /// A forecast evaluation asked for zero days
    NoForecastDays,
    /// The provider found no match for the city
    CityNotFound { city: String },
    /// The provider had no weather data for the city
    NoData { city: String },
    /// The provider returned a payload the pipeline could not read
    MalformedPayload { city: String },
}

impl UserError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            UserError::EmptyQuery => "Please enter a city name for every route point.".to_string(),
            UserError::TooFewCities => "Please enter both a start and an end point.".to_string(),
            UserError::NoForecastDays => "Please choose at least one forecast day.".to_string(),
            UserError::CityNotFound { city } => {
                format!("Could not find \"{city}\". Please check the city name.")
            }
            UserError::NoData { city } => {
                format!("No weather data for \"{city}\". Please check the city name.")
            }
            UserError::MalformedPayload { .. } => {
                "Something went wrong while reading the weather data.".to_string()
            }
        }
    }
}

/// Aggregate over all cities of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    Resolved { reports: Vec<CityReport> },
    UserError { error: UserError },
    ProviderError { status: Option<u16> },
}

impl RouteOutcome {
    /// Whether every city on the route has favorable weather
    #[must_use]
    pub fn is_favorable(&self) -> bool {
        match self {
            RouteOutcome::Resolved { reports } => {
                reports.iter().all(|report| report.assessment.is_favorable())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verdict_json_shape() {
        assert_eq!(
            serde_json::to_value(Verdict::Favorable).unwrap(),
            json!({"verdict": "favorable"})
        );
        assert_eq!(
            serde_json::to_value(Verdict::Unfavorable(Rule::Wind)).unwrap(),
            json!({"verdict": "unfavorable", "reason": "wind"})
        );
    }

    #[test]
    fn test_verdict_description() {
        assert_eq!(Verdict::Favorable.describe(), "Favorable conditions");
        assert_eq!(
            Verdict::Unfavorable(Rule::Precipitation).describe(),
            "Unfavorable conditions - precipitation"
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = RouteOutcome::ProviderError { status: Some(503) };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"outcome": "provider_error", "status": 503})
        );

        let outcome = RouteOutcome::UserError {
            error: UserError::CityNotFound {
                city: "Atlantis".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"outcome": "user_error", "error": {"kind": "city_not_found", "city": "Atlantis"}})
        );
        assert!(!outcome.is_favorable());
    }
}
