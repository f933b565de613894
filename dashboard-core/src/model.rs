use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Forecast days requested when the caller does not say otherwise.
pub const DEFAULT_FORECAST_DAYS: u32 = 5;

/// The forecast endpoint returns one sample every 3 hours.
pub const SAMPLES_PER_DAY: u32 = 8;

/// Unit system passed to the API as `units=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }

    /// Convert a temperature in this unit system to Celsius.
    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            Units::Metric => value,
            Units::Imperial => (value - 32.0) * 5.0 / 9.0,
            Units::Standard => value - 273.15,
        }
    }

    /// Convert a wind speed in this unit system to metres per second.
    pub fn to_mps(&self, value: f64) -> f64 {
        match self {
            Units::Imperial => value * 0.447_04,
            Units::Metric | Units::Standard => value,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Current,
    Forecast { days: u32 },
}

/// One fetch issued on behalf of the user.
///
/// The city is free text and is not checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub city: String,
    pub kind: RequestKind,
}

impl FetchRequest {
    pub fn current(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            kind: RequestKind::Current,
        }
    }

    pub fn forecast(city: impl Into<String>) -> Self {
        Self::forecast_days(city, DEFAULT_FORECAST_DAYS)
    }

    pub fn forecast_days(city: impl Into<String>, days: u32) -> Self {
        Self {
            city: city.into(),
            kind: RequestKind::Forecast { days },
        }
    }

    /// Item limit sent with forecast requests.
    pub fn count(&self) -> Option<u32> {
        match self.kind {
            RequestKind::Current => None,
            RequestKind::Forecast { days } => Some(days * SAMPLES_PER_DAY),
        }
    }
}

/// Raw "current weather" document as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentPayload(pub Value);

/// Raw "forecast" document as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastPayload(pub Value);
