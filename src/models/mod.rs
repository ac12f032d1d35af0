//! Data models for the route weather pipeline
//!
//! - Location: city queries, provider keys and positions
//! - Weather: normalized metrics extracted from provider payloads
//! - Outcome: verdicts and aggregated route results

pub mod location;
pub mod outcome;
pub mod weather;

pub use location::{CityQuery, GeoPosition, LocationKey, ResolvedCity};
pub use outcome::{
    CityAssessment, CityReport, DayAssessment, RouteOutcome, Rule, UserError, Verdict,
};
pub use weather::{DailyMetrics, ExtractionMode, WeatherMetrics};
