//! Plain-text tables for the terminal.

use std::fmt::Write;

use dashboard_core::{CityCatalog, ComparisonRow, Units, report::ForecastSeries};

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }

    out
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join("  ").trim_end());
}

pub fn city_table(catalog: &CityCatalog, cities: &[&str]) -> String {
    let rows: Vec<Vec<String>> = cities
        .iter()
        .map(|city| {
            let location = catalog.locate(city);
            vec![
                city.to_string(),
                location.continent.to_string(),
                location.country.to_string(),
            ]
        })
        .collect();

    table(&["City", "Continent", "Country"], &rows)
}

pub fn comparison_table(rows: &[ComparisonRow], units: Units) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.city.clone(),
                row.temperature_label(units),
                row.humidity_label(),
                row.pressure_label(),
                row.condition.clone(),
            ]
        })
        .collect();

    let header = ["City", "Temperature", "Humidity", "Pressure", "Condition"];
    table(&header, &rows)
}

/// Chart data as a table, followed by the temperature range.
pub fn series_table(series: &ForecastSeries, units: Units) -> String {
    let symbol = units.temperature_symbol();
    let rows: Vec<Vec<String>> = series
        .points
        .iter()
        .map(|p| {
            vec![
                p.time.format("%m/%d %H:%M").to_string(),
                format!("{:.1}{symbol}", p.temperature),
                format!("{}%", p.humidity),
            ]
        })
        .collect();

    let mut out = table(&["Time", "Temperature", "Humidity"], &rows);
    if let Some((lo, hi)) = series.temperature_range() {
        let _ = writeln!(out, "\nRange: {lo:.1}{symbol} to {hi:.1}{symbol}");
    }
    out
}
