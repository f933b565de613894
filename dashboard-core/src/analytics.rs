//! Small heuristics layered on top of current conditions.
//!
//! All inputs are metric: Celsius, percent, m/s and hPa.

use std::fmt;

const IDEAL_TEMP_C: f64 = 22.5;
const IDEAL_HUMIDITY: f64 = 50.0;
const CALM_WIND_MPS: f64 = 5.0;

/// Comfort score in `0.0..=100.0`, the mean of temperature, humidity and
/// wind sub-scores.
pub fn comfort_score(temperature_c: f64, humidity: f64, wind_mps: f64) -> f64 {
    let temp = (100.0 - (temperature_c - IDEAL_TEMP_C).abs() * 4.0).max(0.0);
    let hum = (100.0 - (humidity - IDEAL_HUMIDITY).abs() * 2.0).max(0.0);
    let wind = (100.0 - (wind_mps - CALM_WIND_MPS).max(0.0) * 10.0).max(0.0);

    (temp + hum + wind) / 3.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RainLikelihood {
    VeryLow,
    Low,
    Medium,
    High,
}

impl RainLikelihood {
    pub fn estimate(humidity: f64, pressure_hpa: f64) -> Self {
        if humidity > 80.0 && pressure_hpa < 1013.0 {
            Self::High
        } else if humidity > 60.0 && pressure_hpa < 1015.0 {
            Self::Medium
        } else if humidity > 40.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}

impl fmt::Display for RainLikelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// What to wear, judged on temperature minus a crude wind chill.
pub fn clothing_recommendation(temperature_c: f64, wind_mps: f64) -> &'static str {
    let felt = temperature_c - wind_mps * 2.0;

    match felt {
        t if t < 0.0 => "Heavy winter coat, gloves, hat, and warm boots",
        t if t < 10.0 => "Warm jacket, long pants, and closed shoes",
        t if t < 20.0 => "Light jacket or sweater, long pants",
        t if t < 25.0 => "T-shirt or light shirt, comfortable pants",
        _ => "Light clothing, shorts, and sandals",
    }
}
