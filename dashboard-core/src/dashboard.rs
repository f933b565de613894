//! Owner-side dashboard state.
//!
//! Only the task that runs the poll loop touches a [`Dashboard`]. Workers
//! hand it [`FetchMessage`]s and it turns them into panel text.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::{
    comparison::{ComparisonRow, ComparisonSeries},
    coordinator::FetchMessage,
    model::{CurrentPayload, FetchRequest, RequestKind, Units},
    report::{self, Forecast, ForecastSeries},
};

/// Which part of the dashboard a message updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Current,
    Forecast,
    Comparison,
}

/// Last successfully fetched current conditions, kept for export.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub city: String,
    pub payload: CurrentPayload,
    pub report: String,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    units: Units,
    current: String,
    forecast: String,
    series: ForecastSeries,
    comparison: Vec<ComparisonRow>,
    status: String,
    snapshot: Option<CurrentSnapshot>,
}

impl Dashboard {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            current: String::new(),
            forecast: String::new(),
            series: ForecastSeries::default(),
            comparison: Vec::new(),
            status: "Ready".to_string(),
            snapshot: None,
        }
    }

    /// Show a loading state for a request that was just dispatched.
    pub fn begin(&mut self, request: &FetchRequest) {
        match request.kind {
            RequestKind::Current => {
                self.status = format!("Fetching weather data for {}...", request.city);
                self.current = "Loading weather data...".to_string();
            }
            RequestKind::Forecast { .. } => {
                self.status = format!("Fetching forecast data for {}...", request.city);
                self.forecast = "Loading forecast data...".to_string();
                self.series = ForecastSeries::default();
            }
        }
    }

    pub fn begin_comparison(&mut self) {
        self.status = "Fetching weather data for comparison...".to_string();
        self.comparison.clear();
    }

    /// Fold one worker result into the panels.
    pub fn apply<Tz>(&mut self, message: FetchMessage, now: &DateTime<Tz>) -> Panel
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        match message {
            FetchMessage::Current { city, result } => {
                match result {
                    Ok(payload) => {
                        let text = report::format_current(&payload, self.units, now);
                        self.current = text.clone();
                        self.status = format!("Weather data loaded for {city}");
                        self.snapshot = Some(CurrentSnapshot {
                            city,
                            payload,
                            report: text,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(%city, error = %e, "Current weather fetch failed");
                        self.current = format!("Error: {}", e.user_message());
                        self.status = "Error fetching weather data".to_string();
                    }
                }
                Panel::Current
            }
            FetchMessage::Forecast { city, result, .. } => {
                match result {
                    Ok(payload) => {
                        self.forecast = report::format_forecast(&payload, self.units, now);
                        self.series = Forecast::from_payload(&payload)
                            .map(|f| ForecastSeries::from_forecast(&f, &now.timezone()))
                            .unwrap_or_default();
                        self.status = format!("Forecast data loaded for {city}");
                    }
                    Err(e) => {
                        tracing::warn!(%city, error = %e, "Forecast fetch failed");
                        self.forecast = format!("Error: {}", e.user_message());
                        self.series = ForecastSeries::default();
                        self.status = "Error fetching forecast data".to_string();
                    }
                }
                Panel::Forecast
            }
            FetchMessage::Comparison { rows, .. } => {
                self.status = if rows.is_empty() {
                    "No weather data could be retrieved for comparison".to_string()
                } else {
                    format!("Comparison complete for {} cities", rows.len())
                };
                self.comparison = rows;
                Panel::Comparison
            }
        }
    }

    /// Reset the current-weather panel and forget the snapshot.
    pub fn clear_current(&mut self) {
        self.current.clear();
        self.snapshot = None;
        self.status = "Ready".to_string();
    }

    pub fn current_panel(&self) -> &str {
        &self.current
    }

    pub fn forecast_panel(&self) -> &str {
        &self.forecast
    }

    pub fn forecast_series(&self) -> &ForecastSeries {
        &self.series
    }

    pub fn comparison_rows(&self) -> &[ComparisonRow] {
        &self.comparison
    }

    pub fn comparison_series(&self) -> ComparisonSeries {
        ComparisonSeries::from(self.comparison.as_slice())
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn snapshot(&self) -> Option<&CurrentSnapshot> {
        self.snapshot.as_ref()
    }
}
