//! Route evaluation orchestrator
//!
//! Drives resolve, fetch, extract and assess for every city of a route and
//! folds the per-city results into a single [`RouteOutcome`]. Cities are
//! evaluated concurrently; each pipeline stops at its first failure.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::assessment::Assessor;
use crate::config::AssessmentThresholds;
use crate::error::WeatherError;
use crate::location_resolver::LocationResolver;
use crate::metric_extractor;
use crate::models::{
    CityAssessment, CityQuery, CityReport, DayAssessment, ExtractionMode, RouteOutcome, UserError,
};
use crate::weather::{WeatherApi, WeatherFetcher};

const MIN_ROUTE_CITIES: usize = 2;

/// Which conditions a route is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EvaluationMode {
    Current,
    /// Daily forecast, truncated to the provider window
    Forecast { days: usize },
}

/// Orchestrates the weather pipeline for whole routes
#[derive(Clone)]
pub struct RouteEvaluator {
    resolver: LocationResolver,
    fetcher: WeatherFetcher,
    assessor: Assessor,
}

impl RouteEvaluator {
    #[must_use]
    pub fn new(api: Arc<dyn WeatherApi>, thresholds: AssessmentThresholds) -> Self {
        Self {
            resolver: LocationResolver::new(api.clone()),
            fetcher: WeatherFetcher::new(api),
            assessor: Assessor::new(thresholds),
        }
    }

    #[must_use]
    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    #[must_use]
    pub fn fetcher(&self) -> &WeatherFetcher {
        &self.fetcher
    }

    /// Evaluate a two-city route
    pub async fn evaluate(&self, start: &str, end: &str, mode: EvaluationMode) -> RouteOutcome {
        self.evaluate_cities(&[start, end], mode).await
    }

    /// Evaluate a route through any number of cities, in order
    #[instrument(skip_all, fields(cities = cities.len(), mode = ?mode))]
    pub async fn evaluate_cities<S: AsRef<str>>(
        &self,
        cities: &[S],
        mode: EvaluationMode,
    ) -> RouteOutcome {
        if cities.is_empty() {
            return RouteOutcome::UserError {
                error: UserError::EmptyQuery,
            };
        }

        let queries: Vec<CityQuery> = match cities.iter().map(CityQuery::new).collect() {
            Ok(queries) => queries,
            Err(_) => {
                return RouteOutcome::UserError {
                    error: UserError::EmptyQuery,
                };
            }
        };
        if queries.len() < MIN_ROUTE_CITIES {
            return RouteOutcome::UserError {
                error: UserError::TooFewCities,
            };
        }
        if matches!(mode, EvaluationMode::Forecast { days: 0 }) {
            return RouteOutcome::UserError {
                error: UserError::NoForecastDays,
            };
        }

        let results = join_all(queries.iter().map(|city| self.evaluate_city(city, mode))).await;
        let outcome = aggregate(&queries, results);

        match &outcome {
            RouteOutcome::Resolved { reports } => info!(
                "Route evaluated: {} cities, favorable: {}",
                reports.len(),
                outcome.is_favorable()
            ),
            RouteOutcome::UserError { error } => info!("Route rejected: {:?}", error),
            RouteOutcome::ProviderError { status } => {
                warn!("Route evaluation failed, provider unavailable ({:?})", status);
            }
        }

        outcome
    }

    /// Run the pipeline for a single city
    #[instrument(skip_all, fields(city = %city))]
    pub async fn evaluate_city(
        &self,
        city: &CityQuery,
        mode: EvaluationMode,
    ) -> Result<CityReport, WeatherError> {
        debug!("Resolving");
        let resolved = self.resolver.locate(city).await?;

        let assessment = match mode {
            EvaluationMode::Current => {
                debug!("Fetching current conditions");
                let raw = self.fetcher.fetch_current(&resolved.key).await?;
                let metrics = metric_extractor::extract(&raw, ExtractionMode::Current)?;
                let verdict = self.assessor.assess(&metrics);
                CityAssessment::Current { metrics, verdict }
            }
            EvaluationMode::Forecast { days } => {
                debug!("Fetching {} forecast days", days);
                let forecast = self.fetcher.fetch_forecast(&resolved.key, days).await?;
                let days = forecast
                    .days
                    .iter()
                    .map(|raw| {
                        let day = metric_extractor::extract_day(raw)?;
                        let verdict = self.assessor.assess(&day.metrics);
                        Ok(DayAssessment { day, verdict })
                    })
                    .collect::<Result<Vec<_>, WeatherError>>()?;
                CityAssessment::Forecast {
                    days,
                    link: forecast.link,
                }
            }
        };

        debug!("Assessed, favorable: {}", assessment.is_favorable());
        Ok(CityReport {
            city: resolved,
            assessment,
        })
    }
}

/// Fold per-city results: provider failures dominate user errors, which
/// dominate success. Within a category the first city in route order wins.
fn aggregate(
    queries: &[CityQuery],
    results: Vec<Result<CityReport, WeatherError>>,
) -> RouteOutcome {
    if let Some(status) = results.iter().find_map(|result| match result {
        Err(WeatherError::ProviderUnavailable { status }) => Some(*status),
        Err(WeatherError::Config { .. }) => Some(None),
        _ => None,
    }) {
        return RouteOutcome::ProviderError { status };
    }

    let mut reports = Vec::with_capacity(results.len());
    for (query, result) in queries.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                return RouteOutcome::UserError {
                    error: user_error(query, err),
                };
            }
        }
    }

    RouteOutcome::Resolved { reports }
}

fn user_error(query: &CityQuery, err: WeatherError) -> UserError {
    let city = query.as_str().to_string();
    match err {
        WeatherError::CityNotFound { city } => UserError::CityNotFound { city },
        WeatherError::MalformedPayload { .. } => UserError::MalformedPayload { city },
        WeatherError::Validation { .. } => UserError::EmptyQuery,
        _ => UserError::NoData { city },
    }
}
