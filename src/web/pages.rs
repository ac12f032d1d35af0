//! Server-rendered HTML pages

use std::fmt::Write;

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use super::{AppState, outcome_status};
use crate::models::{CityAssessment, CityReport, RouteOutcome};
use crate::report;
use crate::route_evaluator::EvaluationMode;

const INDEX_PAGE: &str = include_str!("../../assets/index.html");
const MAP_PAGE: &str = include_str!("../../assets/map.html");

#[derive(Debug, Deserialize)]
pub struct RouteForm {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    /// One city per line
    #[serde(default)]
    pub waypoints: String,
}

impl RouteForm {
    /// Start, waypoints and end, in travel order, blank lines dropped
    fn cities(&self) -> Vec<String> {
        let waypoints = self.waypoints.lines().map(str::trim);
        std::iter::once(self.start.trim())
            .chain(waypoints)
            .chain(std::iter::once(self.end.trim()))
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

pub async fn map() -> Html<&'static str> {
    Html(MAP_PAGE)
}

/// Evaluate current conditions for every city on the route and render the result
pub async fn route_weather(State(state): State<AppState>, Form(form): Form<RouteForm>) -> Response {
    let cities = form.cities();
    info!("Route weather check: {}", cities.join(" -> "));
    let outcome = state
        .evaluator
        .evaluate_cities(&cities, EvaluationMode::Current)
        .await;

    let page = match &outcome {
        RouteOutcome::Resolved { reports } => result_page(&form.start, &form.end, reports),
        _ => error_page(&report::failure_message(&outcome).unwrap_or_default()),
    };
    (outcome_status(&outcome), Html(page)).into_response()
}

/// Redirect to the map page carrying the route in the query string
pub async fn plan_route(Form(form): Form<RouteForm>) -> Response {
    if form.start.trim().is_empty() || form.end.trim().is_empty() {
        let page = error_page("Please enter both a start and an end point.");
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    let cities: Vec<String> = form
        .cities()
        .iter()
        .map(|city| urlencoding::encode(city).into_owned())
        .collect();
    Redirect::to(&format!("/map?cities={}", cities.join(","))).into_response()
}

fn result_page(start: &str, end: &str, reports: &[CityReport]) -> String {
    let mut body = format!(
        "<h1>Route weather</h1>\n<p>{} &rarr; {}</p>\n",
        escape(start),
        escape(end)
    );

    for report in reports {
        let CityAssessment::Current { metrics, verdict } = &report.assessment else {
            continue;
        };
        let class = if verdict.is_favorable() { "good" } else { "bad" };
        let _ = write!(
            body,
            "<section>\n<h2>{}</h2>\n<ul>\n\
             <li>Temperature: {}</li>\n<li>Humidity: {}</li>\n\
             <li>Wind speed: {}</li>\n<li>Visibility: {}</li>\n</ul>\n\
             <p class=\"{}\">{}</p>\n</section>\n",
            escape(&report.city.name),
            metrics.format_temperature(),
            metrics.format_humidity(),
            metrics.format_wind(),
            metrics.format_visibility(),
            class,
            verdict.describe(),
        );
    }

    layout("Route weather", &body)
}

fn error_page(message: &str) -> String {
    layout(
        "Error",
        &format!("<h1>Error</h1>\n<p class=\"bad\">{}</p>\n", escape(message)),
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\
         body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}\
         .good {{ color: #2e7d32; }} .bad {{ color: #c62828; }}\
         </style>\n</head>\n<body>\n{body}<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
