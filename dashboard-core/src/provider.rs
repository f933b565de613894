use crate::{
    Config,
    error::FetchResult,
    model::{CurrentPayload, ForecastPayload},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Anything that can answer current-weather and forecast requests.
///
/// Workers hold an `Arc<dyn WeatherSource>`, so implementations must be
/// shareable across tasks.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> FetchResult<CurrentPayload>;

    async fn fetch_forecast(&self, city: &str, days: u32) -> FetchResult<ForecastPayload>;
}

/// Construct the OpenWeatherMap client from config.
///
/// Fails with [`crate::WeatherError::MissingCredential`] when no key is set
/// in the environment or config file.
pub fn source_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherSource>> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::new(api_key, config.units, config.timeout())?
        .with_base_url(&config.base_url);

    Ok(Arc::new(client))
}
