//! Side-by-side current conditions for a user-chosen set of cities.

use serde::Serialize;

use crate::{
    error::FetchResult,
    model::{CurrentPayload, Units},
    provider::WeatherSource,
    report::{CurrentWeather, title_case},
};

/// A comparison needs at least this many cities.
pub const MIN_COMPARISON_CITIES: usize = 2;

/// Ordered city names, de-duplicated on insert by exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSet {
    cities: Vec<String>,
}

impl ComparisonSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a city unless it is blank or already present.
    /// Returns whether the set changed.
    pub fn add(&mut self, city: impl Into<String>) -> bool {
        let city = city.into().trim().to_string();
        if city.is_empty() || self.contains(&city) {
            return false;
        }
        self.cities.push(city);
        true
    }

    pub fn remove(&mut self, city: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c != city);
        self.cities.len() != before
    }

    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.cities.len()).then(|| self.cities.remove(index))
    }

    pub fn clear(&mut self) {
        self.cities.clear();
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c == city)
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.len() >= MIN_COMPARISON_CITIES
    }
}

impl<S: Into<String>> FromIterator<S> for ComparisonSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for city in iter {
            set.add(city);
        }
        set
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// The name the user asked for, not the one the API echoes back.
    pub city: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub condition: String,
}

impl ComparisonRow {
    pub fn from_payload(city: &str, payload: &CurrentPayload) -> FetchResult<Self> {
        let weather = CurrentWeather::from_payload(payload)?;

        Ok(Self {
            city: city.to_string(),
            temperature: weather.temperature,
            humidity: weather.humidity,
            pressure: weather.pressure,
            condition: title_case(&weather.description),
        })
    }

    pub fn temperature_label(&self, units: Units) -> String {
        format!("{:.1}{}", self.temperature, units.temperature_symbol())
    }

    pub fn humidity_label(&self) -> String {
        format!("{}%", self.humidity)
    }

    pub fn pressure_label(&self) -> String {
        format!("{} hPa", self.pressure)
    }
}

/// Fetch each city in turn; cities that fail are logged and left out.
pub async fn fetch_comparison(source: &dyn WeatherSource, cities: &[String]) -> Vec<ComparisonRow> {
    let mut rows = Vec::with_capacity(cities.len());

    for city in cities {
        let row = match source.fetch_current(city).await {
            Ok(payload) => ComparisonRow::from_payload(city, &payload),
            Err(e) => Err(e),
        };

        match row {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(%city, error = %e, "Dropping city from comparison"),
        }
    }

    rows
}

/// Column-oriented view of comparison rows for bar and scatter charts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComparisonSeries {
    pub cities: Vec<String>,
    pub temperatures: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<f64>,
}

impl From<&[ComparisonRow]> for ComparisonSeries {
    fn from(rows: &[ComparisonRow]) -> Self {
        Self {
            cities: rows.iter().map(|r| r.city.clone()).collect(),
            temperatures: rows.iter().map(|r| r.temperature).collect(),
            humidity: rows.iter().map(|r| r.humidity).collect(),
            pressure: rows.iter().map(|r| r.pressure).collect(),
        }
    }
}
