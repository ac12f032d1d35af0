//! JSON endpoints backing the map page and programmatic clients

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::WeatherError;
use crate::metric_extractor;
use crate::models::{CityQuery, GeoPosition, ResolvedCity};
use crate::report::ForecastSeries;
use crate::route_evaluator::EvaluationMode;
use crate::web::{AppState, outcome_status};

const DEFAULT_FORECAST_DAYS: usize = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMarker {
    pub query: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiLeg {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiRoute {
    pub markers: Vec<ApiMarker>,
    pub legs: Vec<ApiLeg>,
    pub total_distance_km: f64,
}

impl From<Vec<ResolvedCity>> for ApiRoute {
    fn from(cities: Vec<ResolvedCity>) -> Self {
        let placed: Vec<(ResolvedCity, GeoPosition)> = cities
            .into_iter()
            .filter_map(|city| city.position.map(|position| (city, position)))
            .collect();

        let legs: Vec<ApiLeg> = placed
            .windows(2)
            .map(|pair| ApiLeg {
                from: pair[0].0.name.clone(),
                to: pair[1].0.name.clone(),
                distance_km: pair[0].1.distance_km(&pair[1].1),
            })
            .collect();

        let total_distance_km = legs.iter().map(|leg| leg.distance_km).sum();
        let markers = placed
            .into_iter()
            .map(|(city, position)| ApiMarker {
                query: city.query.to_string(),
                name: city.name,
                latitude: position.latitude,
                longitude: position.longitude,
            })
            .collect();

        Self {
            markers,
            legs,
            total_distance_km,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationsQuery {
    #[serde(default)]
    pub cities: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub city: String,
    pub days: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeName {
    #[default]
    Current,
    Forecast,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub cities: Vec<String>,
    #[serde(default)]
    pub mode: ModeName,
    pub days: Option<usize>,
}

impl EvaluateRequest {
    fn evaluation_mode(&self) -> EvaluationMode {
        match self.mode {
            ModeName::Current => EvaluationMode::Current,
            ModeName::Forecast => EvaluationMode::Forecast {
                days: self.days.unwrap_or(DEFAULT_FORECAST_DAYS),
            },
        }
    }
}

/// Pipeline failure rendered as a JSON error body
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WeatherError::ProviderUnavailable { .. } | WeatherError::MalformedPayload { .. } => {
                StatusCode::BAD_GATEWAY
            }
            WeatherError::CityNotFound { .. } | WeatherError::NoData => StatusCode::NOT_FOUND,
            WeatherError::Validation { .. } => StatusCode::BAD_REQUEST,
            WeatherError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let payload = json!({ "error": self.0.user_message() });
        (status, Json(payload)).into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(get_locations))
        .route("/forecast", get(get_forecast))
        .route("/evaluate", post(evaluate_route))
}

/// Markers for the cities that resolve with a position, plus leg distances.
/// Cities the provider does not know are left off the map.
async fn get_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationsQuery>,
) -> Result<Json<ApiRoute>, ApiError> {
    let cities: Vec<CityQuery> = query
        .cities
        .split(',')
        .filter_map(|city| CityQuery::new(city).ok())
        .collect();

    let resolver = state.evaluator.resolver();
    let results = join_all(cities.iter().map(|city| resolver.locate(city))).await;

    let mut resolved = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(city) => resolved.push(city),
            Err(err) if err.is_provider_failure() => return Err(err.into()),
            Err(err) => warn!("Skipping city on map: {}", err),
        }
    }

    Ok(Json(ApiRoute::from(resolved)))
}

async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastSeries>, ApiError> {
    let city = CityQuery::new(&query.city)?;
    let days = query.days.unwrap_or(DEFAULT_FORECAST_DAYS);

    let resolved = state.evaluator.resolver().locate(&city).await?;
    let forecast = state
        .evaluator
        .fetcher()
        .fetch_forecast(&resolved.key, days)
        .await?;
    let daily = forecast
        .days
        .iter()
        .map(metric_extractor::extract_day)
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(Json(ForecastSeries::from_days(resolved.name, &daily)))
}

async fn evaluate_route(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    let outcome = state
        .evaluator
        .evaluate_cities(&request.cities, request.evaluation_mode())
        .await;
    (outcome_status(&outcome), Json(outcome)).into_response()
}
