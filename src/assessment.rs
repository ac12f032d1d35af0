//! Good/bad weather classification
//!
//! Rules are checked in [`Rule::ORDER`]; the first one that fails becomes the
//! verdict's reason. Metrics a payload mode does not provide are skipped.

use crate::config::AssessmentThresholds;
use crate::models::{Rule, Verdict, WeatherMetrics};

/// Applies the favorability rules to normalized metrics
#[derive(Debug, Clone, Default)]
pub struct Assessor {
    thresholds: AssessmentThresholds,
}

impl Assessor {
    #[must_use]
    pub fn new(thresholds: AssessmentThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify `metrics` as favorable or name the first violated rule
    #[must_use]
    pub fn assess(&self, metrics: &WeatherMetrics) -> Verdict {
        Rule::ORDER
            .into_iter()
            .find(|rule| !self.passes(*rule, metrics))
            .map_or(Verdict::Favorable, Verdict::Unfavorable)
    }

    fn passes(&self, rule: Rule, metrics: &WeatherMetrics) -> bool {
        let t = &self.thresholds;
        match rule {
            Rule::Temperature => {
                (t.min_temperature..=t.max_temperature).contains(&metrics.temperature)
            }
            Rule::Humidity => metrics
                .humidity
                .is_none_or(|h| (t.min_humidity..=t.max_humidity).contains(&h)),
            Rule::Wind => metrics.wind_speed <= t.max_wind_speed,
            Rule::Visibility => metrics.visibility.is_none_or(|v| v >= t.min_visibility),
            Rule::Precipitation => {
                metrics
                    .precipitation_probability
                    .is_none_or(|p| p <= t.max_precipitation_probability)
                    && !metrics.has_precipitation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn nominal() -> WeatherMetrics {
        WeatherMetrics {
            temperature: 20.0,
            humidity: Some(45),
            wind_speed: 10.0,
            visibility: Some(15.0),
            precipitation_probability: Some(10),
            has_precipitation: false,
        }
    }

    fn forecast_day() -> WeatherMetrics {
        WeatherMetrics {
            temperature: 20.0,
            humidity: None,
            wind_speed: 10.0,
            visibility: None,
            precipitation_probability: Some(20),
            has_precipitation: false,
        }
    }

    #[test]
    fn test_nominal_is_favorable() {
        assert_eq!(Assessor::default().assess(&nominal()), Verdict::Favorable);
    }

    #[rstest]
    #[case::too_cold(|m: &mut WeatherMetrics| m.temperature = -0.5, Rule::Temperature)]
    #[case::too_hot(|m: &mut WeatherMetrics| m.temperature = 35.1, Rule::Temperature)]
    #[case::too_dry(|m: &mut WeatherMetrics| m.humidity = Some(29), Rule::Humidity)]
    #[case::too_humid(|m: &mut WeatherMetrics| m.humidity = Some(61), Rule::Humidity)]
    #[case::windy(|m: &mut WeatherMetrics| m.wind_speed = 50.5, Rule::Wind)]
    #[case::foggy(|m: &mut WeatherMetrics| m.visibility = Some(9.9), Rule::Visibility)]
    #[case::likely_rain(|m: &mut WeatherMetrics| m.precipitation_probability = Some(71), Rule::Precipitation)]
    #[case::raining(|m: &mut WeatherMetrics| m.has_precipitation = true, Rule::Precipitation)]
    fn test_single_violation(#[case] violate: fn(&mut WeatherMetrics), #[case] expected: Rule) {
        let mut metrics = nominal();
        violate(&mut metrics);
        assert_eq!(
            Assessor::default().assess(&metrics),
            Verdict::Unfavorable(expected)
        );
    }

    #[rstest]
    #[case(0.0)]
    #[case(35.0)]
    fn test_temperature_bounds_are_inclusive(#[case] temperature: f64) {
        let metrics = WeatherMetrics {
            temperature,
            ..nominal()
        };
        assert!(Assessor::default().assess(&metrics).is_favorable());
    }

    #[test]
    fn test_boundary_values_are_favorable() {
        let metrics = WeatherMetrics {
            temperature: 35.0,
            humidity: Some(60),
            wind_speed: 50.0,
            visibility: Some(10.0),
            precipitation_probability: Some(70),
            has_precipitation: false,
        };
        assert_eq!(Assessor::default().assess(&metrics), Verdict::Favorable);
    }

    #[test]
    fn test_forecast_day_skips_humidity_and_visibility() {
        assert_eq!(
            Assessor::default().assess(&forecast_day()),
            Verdict::Favorable
        );
    }

    #[test]
    fn test_forecast_day_without_probability_is_favorable() {
        let metrics = WeatherMetrics {
            precipitation_probability: None,
            ..forecast_day()
        };
        assert_eq!(Assessor::default().assess(&metrics), Verdict::Favorable);
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let metrics = WeatherMetrics {
            temperature: 40.0,
            humidity: Some(90),
            wind_speed: 80.0,
            visibility: Some(1.0),
            precipitation_probability: Some(95),
            has_precipitation: true,
        };
        assert_eq!(
            Assessor::default().assess(&metrics),
            Verdict::Unfavorable(Rule::Temperature)
        );

        let metrics = WeatherMetrics {
            temperature: 20.0,
            ..metrics
        };
        assert_eq!(
            Assessor::default().assess(&metrics),
            Verdict::Unfavorable(Rule::Humidity)
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let assessor = Assessor::new(AssessmentThresholds {
            max_wind_speed: 5.0,
            ..AssessmentThresholds::default()
        });
        assert_eq!(
            assessor.assess(&nominal()),
            Verdict::Unfavorable(Rule::Wind)
        );
    }
}
