//! `RouteWeather` - Weather assessment for travel routes
//!
//! This library resolves city names through a weather provider, fetches
//! current conditions or daily forecasts, classifies them as favorable or not
//! and serves the results through a web dashboard, a chat bot and the CLI.

pub mod api;
pub mod assessment;
pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod location_resolver;
pub mod metric_extractor;
pub mod models;
pub mod report;
pub mod route_evaluator;
pub mod telemetry;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use assessment::Assessor;
pub use config::{AssessmentThresholds, RouteWeatherConfig};
pub use error::WeatherError;
pub use location_resolver::LocationResolver;
pub use models::{CityQuery, LocationKey, RouteOutcome, Verdict, WeatherMetrics};
pub use route_evaluator::{EvaluationMode, RouteEvaluator};
pub use weather::{AccuWeatherClient, WeatherApi, WeatherFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
