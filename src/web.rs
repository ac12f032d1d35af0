//! Web server: HTML pages at the root, JSON endpoints under `/api`

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::api;
use crate::config::RouteWeatherConfig;
use crate::models::RouteOutcome;
use crate::route_evaluator::RouteEvaluator;
use crate::weather::{AccuWeatherClient, WeatherApi};

mod pages;

/// Forms and evaluation requests are a few hundred bytes
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared handler state; every request builds its own city list
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<RouteEvaluator>,
}

impl AppState {
    #[must_use]
    pub fn new(evaluator: RouteEvaluator) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }
}

/// HTTP status for an evaluated route
#[must_use]
pub fn outcome_status(outcome: &RouteOutcome) -> StatusCode {
    match outcome {
        RouteOutcome::Resolved { .. } => StatusCode::OK,
        RouteOutcome::UserError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RouteOutcome::ProviderError { .. } => StatusCode::BAD_GATEWAY,
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(pages::index))
        .route("/weather/route", post(pages::route_weather))
        .route("/route", post(pages::plan_route))
        .route("/map", get(pages::map))
        .route("/health", get(health))
        .nest("/api", api::router())
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(cors),
        )
        .with_state(state)
}

pub async fn run(config: &RouteWeatherConfig) -> Result<()> {
    let client = AccuWeatherClient::new(&config.provider)?;
    let api: Arc<dyn WeatherApi> = Arc::new(client);
    let state = AppState::new(RouteEvaluator::new(api, config.assessment.clone()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app(state))
        .await
        .context("Web server terminated")
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
