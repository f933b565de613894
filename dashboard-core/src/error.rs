//! Error taxonomy for weather fetches.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Request for '{city}' failed: {reason}")]
    Network { city: String, reason: String },

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error(
        "No OpenWeatherMap API key configured.\n\
         Hint: set OPENWEATHER_API_KEY or run `weather-dashboard configure`."
    )]
    MissingCredential,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Worker for '{0}' stopped before reporting a result")]
    WorkerAborted(String),
}

impl WeatherError {
    pub fn network(city: &str, reason: impl std::fmt::Display) -> Self {
        Self::Network {
            city: city.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Message shown in the dashboard panel.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { city, .. } => format!("Could not fetch weather data for {city}"),
            Self::CityNotFound(city) => {
                format!("No city named '{city}' is known to the weather service")
            }
            Self::MissingCredential => "An API key is required to fetch weather data".to_string(),
            Self::MalformedPayload(reason) => {
                format!("Unexpected response from weather service: {reason}")
            }
            Self::WorkerAborted(city) => format!("Fetch for {city} was interrupted"),
        }
    }

    /// Whether trying the same request again later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::WorkerAborted(_))
    }
}

pub type FetchResult<T> = Result<T, WeatherError>;
