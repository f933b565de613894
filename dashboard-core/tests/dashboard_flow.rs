//! Coordinator + client + dashboard against a mock weather service.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use dashboard_core::{
    Dashboard, FetchCoordinator, FetchRequest, Panel, Units, WeatherSource,
    provider::openweather::OpenWeatherClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current(city: &str, temp: f64) -> serde_json::Value {
    json!({
        "name": city,
        "sys": { "country": "XX", "sunrise": 1_760_563_800, "sunset": 1_760_604_600 },
        "main": { "temp": temp, "feels_like": temp, "humidity": 40, "pressure": 1015 },
        "weather": [{ "main": "Clouds", "description": "broken clouds" }],
        "wind": { "speed": 1.5 }
    })
}

async fn mount_city(server: &MockServer, city: &str, temp: f64, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current(city, temp))
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

async fn coordinator(server: &MockServer) -> FetchCoordinator {
    let client = OpenWeatherClient::new("KEY".into(), Units::Metric, Duration::from_secs(5))
        .unwrap()
        .with_base_url(&server.uri());
    let source: Arc<dyn WeatherSource> = Arc::new(client);
    FetchCoordinator::new(source, Duration::from_millis(100))
}

#[tokio::test]
async fn faster_city_is_displayed_first() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", 14.0, 500).await;
    mount_city(&server, "Oslo", 3.0, 50).await;

    let mut coord = coordinator(&server).await;
    let mut dash = Dashboard::new(Units::Metric);

    for city in ["Paris", "Oslo"] {
        let request = FetchRequest::current(city);
        dash.begin(&request);
        coord.dispatch(request);
    }

    let mut shown = Vec::new();
    coord
        .run_until_idle(|message| {
            assert_eq!(dash.apply(message, &Utc::now()), Panel::Current);
            shown.push(dash.status().to_string());
        })
        .await;

    assert_eq!(
        shown,
        [
            "Weather data loaded for Oslo",
            "Weather data loaded for Paris"
        ]
    );
    assert!(dash.current_panel().contains("Paris, XX"));
}

#[tokio::test]
async fn failure_then_success_both_reach_the_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_city(&server, "Lima", 19.0, 300).await;

    let mut coord = coordinator(&server).await;
    let mut dash = Dashboard::new(Units::Metric);

    coord.dispatch_current("Atlantis");
    coord.dispatch_current("Lima");

    let mut panels = Vec::new();
    coord
        .run_until_idle(|message| {
            dash.apply(message, &Utc::now());
            panels.push(dash.current_panel().to_string());
        })
        .await;

    assert_eq!(panels.len(), 2);
    assert!(
        panels[0].contains("Atlantis"),
        "first panel was {:?}",
        panels[0]
    );
    assert!(panels[1].contains("Lima, XX"));
    assert_eq!(dash.snapshot().map(|s| s.city.as_str()), Some("Lima"));
}

#[tokio::test]
async fn timeout_then_success_both_reach_the_dashboard() {
    let server = MockServer::start().await;
    mount_city(&server, "Tokyo", 18.3, 2_000).await;
    mount_city(&server, "Lima", 19.0, 0).await;

    let timeout = Duration::from_millis(200);
    let client = OpenWeatherClient::new("KEY".into(), Units::Metric, timeout)
        .unwrap()
        .with_base_url(&server.uri());
    let source: Arc<dyn WeatherSource> = Arc::new(client);
    let mut coord = FetchCoordinator::new(source, Duration::from_millis(50));
    let mut dash = Dashboard::new(Units::Metric);

    coord.dispatch_current("Tokyo");

    let mut panels = Vec::new();
    coord
        .run_until_idle(|message| {
            assert!(!message.is_success());
            dash.apply(message, &Utc::now());
            panels.push(dash.current_panel().to_string());
        })
        .await;

    coord.dispatch_current("Lima");
    coord
        .run_until_idle(|message| {
            dash.apply(message, &Utc::now());
            panels.push(dash.current_panel().to_string());
        })
        .await;

    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0], "Error: Could not fetch weather data for Tokyo");
    assert!(panels[1].contains("Lima, XX"));
    assert_eq!(dash.status(), "Weather data loaded for Lima");
}

#[tokio::test]
async fn comparison_drops_failed_cities() {
    let server = MockServer::start().await;
    mount_city(&server, "Oslo", 3.0, 0).await;
    mount_city(&server, "Lima", 19.0, 0).await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Nowhere"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut coord = coordinator(&server).await;
    let mut dash = Dashboard::new(Units::Metric);

    dash.begin_comparison();
    coord.dispatch_comparison(vec!["Oslo".into(), "Nowhere".into(), "Lima".into()]);
    coord
        .run_until_idle(|message| {
            dash.apply(message, &Utc::now());
        })
        .await;

    let rows = dash.comparison_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].city, "Oslo");
    assert_eq!(rows[0].temperature_label(Units::Metric), "3.0°C");
    assert_eq!(rows[1].condition, "Broken Clouds");
    assert_eq!(dash.status(), "Comparison complete for 2 cities");
    assert_eq!(dash.comparison_series().temperatures, [3.0, 19.0]);
}
