//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - The static city directory and its lookups
//! - The OpenWeatherMap client behind the `WeatherSource` seam
//! - The fetch coordinator that runs requests in background workers and
//!   reconciles their results on the owner task
//! - Report formatting, comparison, analytics and snapshot export
//! - Configuration & credentials handling
//!
//! It is used by `dashboard-cli`, but can also be driven by other front-ends.

pub mod analytics;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod coordinator;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod model;
pub mod provider;
pub mod report;

pub use catalog::{CityCatalog, CityLocation};
pub use comparison::{ComparisonRow, ComparisonSet};
pub use config::Config;
pub use coordinator::{FetchCoordinator, FetchMessage};
pub use dashboard::{Dashboard, Panel};
pub use error::{FetchResult, WeatherError};
pub use model::{CurrentPayload, FetchRequest, ForecastPayload, RequestKind, Units};
pub use provider::{WeatherSource, source_from_config};
