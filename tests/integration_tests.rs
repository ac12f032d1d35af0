//! End-to-end route evaluation against a mocked provider.

use std::sync::Arc;

use chrono::NaiveDate;
use route_weather::config::ProviderConfig;
use route_weather::models::{CityAssessment, UserError};
use route_weather::{
    AccuWeatherClient, AssessmentThresholds, EvaluationMode, RouteEvaluator, RouteOutcome,
    WeatherApi,
};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn evaluator(server: &MockServer) -> RouteEvaluator {
    let client = AccuWeatherClient::new(&ProviderConfig {
        api_key: Some("test_api_key".to_string()),
        base_url: server.uri(),
        timeout_seconds: 5,
    })
    .unwrap();
    let api: Arc<dyn WeatherApi> = Arc::new(client);
    RouteEvaluator::new(api, AssessmentThresholds::default())
}

async fn mount_city(server: &MockServer, name: &str, key: &str) {
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("q", name))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Key": key,
            "LocalizedName": name,
            "GeoPosition": {"Latitude": 48.857, "Longitude": 2.341}
        }])))
        .mount(server)
        .await;
}

async fn mount_current(server: &MockServer, key: &str, temperature: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/currentconditions/v1/{key}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "Temperature": {"Metric": {"Value": temperature, "Unit": "C"}},
            "RelativeHumidity": 50,
            "Wind": {"Speed": {"Metric": {"Value": 12.0, "Unit": "km/h"}}},
            "Visibility": {"Metric": {"Value": 16.1, "Unit": "km"}},
            "HasPrecipitation": false
        }])))
        .mount(server)
        .await;
}

fn forecast(days: u32) -> Value {
    let daily: Vec<Value> = (1..=days)
        .map(|day| {
            json!({
                "Date": format!("2024-06-{day:02}T07:00:00+02:00"),
                "Temperature": {"Maximum": {"Value": 24.0, "Unit": "C"}},
                "Day": {
                    "PrecipitationProbability": 20,
                    "Wind": {"Speed": {"Value": 9.3, "Unit": "km/h"}}
                }
            })
        })
        .collect();
    json!({
        "Headline": {"Link": "http://www.accuweather.com/forecast"},
        "DailyForecasts": daily
    })
}

#[tokio::test]
async fn test_current_route_resolves() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Paris", "623").await;
    mount_city(&mock_server, "Berlin", "178087").await;
    mount_current(&mock_server, "623", 22.0).await;
    mount_current(&mock_server, "178087", 19.0).await;

    let outcome = evaluator(&mock_server)
        .evaluate("Paris", "Berlin", EvaluationMode::Current)
        .await;

    assert!(matches!(&outcome, RouteOutcome::Resolved { reports } if reports.len() == 2));
    assert!(outcome.is_favorable());
}

#[tokio::test]
async fn test_unknown_city_is_user_error() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Paris", "623").await;
    mount_current(&mock_server, "623", 22.0).await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .and(query_param("q", "Unknown_City_Xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let outcome = evaluator(&mock_server)
        .evaluate("Paris", "Unknown_City_Xyz", EvaluationMode::Current)
        .await;

    assert_eq!(
        outcome,
        RouteOutcome::UserError {
            error: UserError::CityNotFound {
                city: "Unknown_City_Xyz".to_string()
            }
        }
    );
}

#[tokio::test]
async fn test_service_unavailable_dominates() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Paris", "623").await;
    mount_city(&mock_server, "Berlin", "178087").await;
    mount_current(&mock_server, "623", 22.0).await;
    Mock::given(method("GET"))
        .and(path("/currentconditions/v1/178087"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let outcome = evaluator(&mock_server)
        .evaluate("Paris", "Berlin", EvaluationMode::Current)
        .await;

    assert_eq!(outcome, RouteOutcome::ProviderError { status: Some(503) });
}

#[tokio::test]
async fn test_forecast_request_beyond_window_is_truncated() {
    let mock_server = MockServer::start().await;
    mount_city(&mock_server, "Paris", "623").await;
    mount_city(&mock_server, "Berlin", "178087").await;
    for key in ["623", "178087"] {
        Mock::given(method("GET"))
            .and(path(format!("/forecasts/v1/daily/5day/{key}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast(5)))
            .mount(&mock_server)
            .await;
    }

    let outcome = evaluator(&mock_server)
        .evaluate("Paris", "Berlin", EvaluationMode::Forecast { days: 10 })
        .await;

    let RouteOutcome::Resolved { reports } = outcome else {
        panic!("expected resolved outcome");
    };
    for report in reports {
        let CityAssessment::Forecast { days, link } = report.assessment else {
            panic!("expected forecast assessment");
        };
        assert!(days.len() <= 5);
        assert_eq!(days[0].day.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert!(days.windows(2).all(|pair| pair[0].day.date < pair[1].day.date));
        assert_eq!(link.as_deref(), Some("http://www.accuweather.com/forecast"));
    }
}

#[tokio::test]
async fn test_keys_are_resolved_on_every_evaluation() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locations/v1/cities/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"Key": "623"}])))
        .expect(4)
        .mount(&mock_server)
        .await;
    mount_current(&mock_server, "623", 22.0).await;

    let evaluator = evaluator(&mock_server);
    for _ in 0..2 {
        evaluator
            .evaluate("Paris", "Paris", EvaluationMode::Current)
            .await;
    }
}
