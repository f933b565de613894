use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::{
    config::DEFAULT_BASE_URL,
    error::{FetchResult, WeatherError},
    model::{CurrentPayload, FetchRequest, ForecastPayload, RequestKind, Units},
};

use super::WeatherSource;

/// OpenWeatherMap 2.5 client: one GET per call, fixed timeout, no retry.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    units: Units,
    timeout: Duration,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, units: Units, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units,
            timeout,
            http,
        })
    }

    /// Point the client at another host, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn endpoint(&self, request: &FetchRequest) -> String {
        let path = match request.kind {
            RequestKind::Current => "weather",
            RequestKind::Forecast { .. } => "forecast",
        };
        format!("{}/{path}", self.base_url)
    }

    pub fn query_params(&self, request: &FetchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.city.clone()),
            ("appid", self.api_key.clone()),
            ("units", self.units.as_str().to_string()),
        ];
        if let Some(count) = request.count() {
            params.push(("cnt", count.to_string()));
        }
        params
    }

    async fn fetch(&self, request: &FetchRequest) -> FetchResult<Value> {
        let url = self.endpoint(request);
        let city = request.city.as_str();
        tracing::debug!(%city, endpoint = %url, "Requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(|e| self.transport_error(city, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport_error(city, e))?;

        if status == StatusCode::NOT_FOUND {
            tracing::warn!(%city, "Weather service does not know this city");
            return Err(WeatherError::CityNotFound(city.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(%city, %status, "Weather request failed");
            return Err(WeatherError::network(
                city,
                format!("status {status}: {}", truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| WeatherError::MalformedPayload(format!("response is not JSON: {e}")))
    }

    fn transport_error(&self, city: &str, err: reqwest::Error) -> WeatherError {
        tracing::warn!(%city, error = %err, "Weather request did not complete");
        if err.is_timeout() {
            WeatherError::network(city, format!("timed out after {}s", self.timeout.as_secs()))
        } else {
            WeatherError::network(city, err.without_url())
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current(&self, city: &str) -> FetchResult<CurrentPayload> {
        self.fetch(&FetchRequest::current(city))
            .await
            .map(CurrentPayload)
    }

    async fn fetch_forecast(&self, city: &str, days: u32) -> FetchResult<ForecastPayload> {
        self.fetch(&FetchRequest::forecast_days(city, days))
            .await
            .map(ForecastPayload)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
