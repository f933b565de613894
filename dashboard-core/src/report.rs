//! Turning raw API payloads into text reports and chart series.
//!
//! Formatting never fails: a payload missing an expected field renders as an
//! inline error line so the rest of the dashboard keeps working.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::fmt::{Display, Write};

use crate::{
    analytics::{self, RainLikelihood},
    error::{FetchResult, WeatherError},
    model::{CurrentPayload, ForecastPayload, Units},
};

/// Days shown in a forecast report.
pub const REPORT_DAYS: usize = 5;
/// Samples listed under each forecast day.
pub const SAMPLES_PER_REPORT_DAY: usize = 4;
/// Samples plotted in the forecast chart.
pub const CHART_SAMPLES: usize = 20;

const RULE: &str = "==============================================================";

#[derive(Debug, Deserialize)]
struct RawCondition {
    #[serde(default)]
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct RawWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct RawSys {
    country: String,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    name: String,
    sys: RawSys,
    main: RawMain,
    weather: Vec<RawCondition>,
    wind: RawWind,
    #[serde(default)]
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    dt: i64,
    main: RawMain,
    weather: Vec<RawCondition>,
    #[serde(default)]
    wind: Option<RawWind>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    city: RawCity,
    list: Vec<RawSample>,
}

/// Typed view over a current-weather payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    /// Short condition group, e.g. "Clear".
    pub condition: String,
    /// Longer description, e.g. "clear sky".
    pub description: String,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub visibility_m: Option<f64>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl CurrentWeather {
    pub fn from_payload(payload: &CurrentPayload) -> FetchResult<Self> {
        let raw: RawCurrent = decode(&payload.0)?;
        let condition = first_condition(raw.weather)?;

        Ok(Self {
            city: raw.name,
            country: raw.sys.country,
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like.unwrap_or(raw.main.temp),
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            condition: condition.main,
            description: condition.description,
            wind_speed: raw.wind.speed,
            wind_deg: raw.wind.deg,
            visibility_m: raw.visibility,
            sunrise: timestamp(raw.sys.sunrise)?,
            sunset: timestamp(raw.sys.sunset)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub description: String,
    pub wind_speed: f64,
}

/// Typed view over a forecast payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub samples: Vec<ForecastSample>,
}

impl Forecast {
    pub fn from_payload(payload: &ForecastPayload) -> FetchResult<Self> {
        let raw: RawForecast = decode(&payload.0)?;
        let samples = raw
            .list
            .into_iter()
            .map(|s| {
                Ok(ForecastSample {
                    time: timestamp(s.dt)?,
                    temperature: s.main.temp,
                    humidity: s.main.humidity,
                    pressure: s.main.pressure,
                    description: first_condition(s.weather)?.description,
                    wind_speed: s.wind.map(|w| w.speed).unwrap_or_default(),
                })
            })
            .collect::<FetchResult<Vec<_>>>()?;

        Ok(Self {
            city: raw.city.name,
            country: raw.city.country,
            samples,
        })
    }
}

/// One calendar day of forecast samples.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Most frequent description of the day, title-cased.
    pub headline: String,
    pub avg_humidity: f64,
    pub avg_pressure: f64,
    pub samples: Vec<ForecastSample>,
}

/// Group samples by their calendar date in `tz`, keeping first-seen order.
pub fn daily_summaries<Tz: TimeZone>(forecast: &Forecast, tz: &Tz) -> Vec<DailySummary> {
    let mut days: Vec<(NaiveDate, Vec<ForecastSample>)> = Vec::new();

    for sample in &forecast.samples {
        let date = sample.time.with_timezone(tz).date_naive();
        match days.last_mut() {
            Some((d, group)) if *d == date => group.push(sample.clone()),
            _ => match days.iter_mut().find(|(d, _)| *d == date) {
                Some((_, group)) => group.push(sample.clone()),
                None => days.push((date, vec![sample.clone()])),
            },
        }
    }

    days.into_iter()
        .map(|(date, samples)| {
            let n = samples.len() as f64;
            let temps = samples.iter().map(|s| s.temperature);
            DailySummary {
                date,
                min_temp: temps.clone().fold(f64::INFINITY, f64::min),
                max_temp: temps.fold(f64::NEG_INFINITY, f64::max),
                headline: title_case(most_common(samples.iter().map(|s| s.description.as_str()))),
                avg_humidity: samples.iter().map(|s| s.humidity).sum::<f64>() / n,
                avg_pressure: samples.iter().map(|s| s.pressure).sum::<f64>() / n,
                samples,
            }
        })
        .collect()
}

/// Most frequent value; on a tie the value seen first wins.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> &'a str {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (v, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((v, n)),
        })
        .map(|(v, _)| v)
        .unwrap_or("")
}

/// Render the current-weather panel.
pub fn format_current<Tz>(payload: &CurrentPayload, units: Units, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match CurrentWeather::from_payload(payload) {
        Ok(weather) => current_report(&weather, units, now),
        Err(e) => format!("Error formatting weather data: {}", malformed_reason(&e)),
    }
}

fn current_report<Tz>(w: &CurrentWeather, units: Units, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let deg = units.temperature_symbol();
    let speed = units.speed_symbol();
    let visibility = w
        .visibility_m
        .map(|m| format!("{:.1} km", m / 1000.0))
        .unwrap_or_else(|| "N/A".to_string());

    let temp_c = units.to_celsius(w.temperature);
    let wind_mps = units.to_mps(w.wind_speed);
    let sunrise = w.sunrise.with_timezone(&tz).format("%H:%M:%S");
    let sunset = w.sunset.with_timezone(&tz).format("%H:%M:%S");
    let comfort = analytics::comfort_score(temp_c, w.humidity, wind_mps);
    let rain = RainLikelihood::estimate(w.humidity, w.pressure);
    let clothing = analytics::clothing_recommendation(temp_c, wind_mps);

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "                    CURRENT WEATHER REPORT");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Location:      {}, {}", w.city, w.country);
    let _ = writeln!(out, "Last updated:  {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Temperature");
    let _ = writeln!(out, "  Current:     {}{deg}", w.temperature);
    let _ = writeln!(out, "  Feels like:  {}{deg}", w.feels_like);
    let _ = writeln!(out, "  Condition:   {}", title_case(&w.description));
    let _ = writeln!(out);
    let _ = writeln!(out, "Atmosphere");
    let _ = writeln!(out, "  Humidity:    {}%", w.humidity);
    let _ = writeln!(out, "  Pressure:    {} hPa", w.pressure);
    let _ = writeln!(out, "  Visibility:  {visibility}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Wind");
    let _ = writeln!(out, "  Speed:       {} {speed}", w.wind_speed);
    let _ = writeln!(out, "  Direction:   {}°", w.wind_deg);
    let _ = writeln!(out);
    let _ = writeln!(out, "Sun");
    let _ = writeln!(out, "  Sunrise:     {sunrise}");
    let _ = writeln!(out, "  Sunset:      {sunset}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Outlook");
    let _ = writeln!(out, "  Comfort:     {comfort:.0}/100");
    let _ = writeln!(out, "  Rain chance: {rain}");
    let _ = writeln!(out, "  Clothing:    {clothing}");
    let _ = write!(out, "{RULE}");
    out
}

/// Render the forecast panel: a header then up to [`REPORT_DAYS`] days.
pub fn format_forecast<Tz>(payload: &ForecastPayload, units: Units, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match Forecast::from_payload(payload) {
        Ok(forecast) => forecast_report(&forecast, units, now),
        Err(e) => format!("Error formatting forecast data: {}", malformed_reason(&e)),
    }
}

fn forecast_report<Tz>(forecast: &Forecast, units: Units, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tz = now.timezone();
    let deg = units.temperature_symbol();

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{:>20}{REPORT_DAYS}-DAY WEATHER FORECAST", "");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Location:   {}, {}", forecast.city, forecast.country);
    let _ = writeln!(out, "Generated:  {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{RULE}");

    for day in daily_summaries(forecast, &tz).iter().take(REPORT_DAYS) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", day.date.format("%A, %B %d, %Y"));
        let _ = writeln!(out, "{}", &RULE[..60]);
        let _ = writeln!(
            out,
            "Temperature range: {:.1}{deg} - {:.1}{deg}",
            day.min_temp, day.max_temp
        );
        let _ = writeln!(out, "Condition:         {}", day.headline);
        let _ = writeln!(out, "Average humidity:  {:.0}%", day.avg_humidity);
        let _ = writeln!(out, "Average pressure:  {:.0} hPa", day.avg_pressure);
        let _ = writeln!(out);
        let _ = writeln!(out, "Samples:");
        for sample in day.samples.iter().take(SAMPLES_PER_REPORT_DAY) {
            let _ = writeln!(
                out,
                "  {}: {}{deg}, {}",
                sample.time.with_timezone(&tz).format("%H:%M"),
                sample.temperature,
                title_case(&sample.description)
            );
        }
    }

    out
}

/// One point of the forecast chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub humidity: f64,
}

/// Temperature and humidity over the first [`CHART_SAMPLES`] samples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForecastSeries {
    pub points: Vec<SeriesPoint>,
}

impl ForecastSeries {
    pub fn from_forecast<Tz: TimeZone>(forecast: &Forecast, tz: &Tz) -> Self {
        let points = forecast
            .samples
            .iter()
            .take(CHART_SAMPLES)
            .map(|s| SeriesPoint {
                time: s.time.with_timezone(tz).naive_local(),
                temperature: s.temperature,
                humidity: s.humidity,
            })
            .collect();

        Self { points }
    }

    pub fn temperature_range(&self) -> Option<(f64, f64)> {
        let mut temps = self.points.iter().map(|p| p.temperature);
        let first = temps.next()?;
        Some(temps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

/// Python-style title case: upper-case every letter that follows a
/// non-letter, lower-case the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for ch in s.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }

    out
}

fn decode<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> FetchResult<T> {
    T::deserialize(value).map_err(|e| WeatherError::MalformedPayload(e.to_string()))
}

fn first_condition(conditions: Vec<RawCondition>) -> FetchResult<RawCondition> {
    conditions
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::MalformedPayload("missing field `weather[0]`".to_string()))
}

fn timestamp(ts: i64) -> FetchResult<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| WeatherError::MalformedPayload(format!("timestamp {ts} out of range")))
}

fn malformed_reason(err: &WeatherError) -> String {
    match err {
        WeatherError::MalformedPayload(reason) => reason.clone(),
        other => other.to_string(),
    }
}
