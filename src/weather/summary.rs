//! Human-readable weather reports

use chrono::NaiveDate;

use super::openmeteo::{DailyData, value_at};
use crate::models::{
    CurrentConditions, ForecastDay, weather_code_to_description, wind_direction_to_compass,
};

/// Render a multi-day forecast report
#[must_use]
pub fn summarize(location_name: &str, days: &[ForecastDay]) -> String {
    let slots: Vec<Option<ForecastDay>> = days.iter().cloned().map(Some).collect();
    render_slots(location_name, &slots)
}

/// Render straight from the upstream daily arrays.
///
/// At most `requested` days are rendered, never more than the payload's
/// `time` array holds. A day with a missing or malformed required value gets
/// a placeholder line instead of failing the report.
#[must_use]
pub fn summarize_daily(location_name: &str, daily: &DailyData, requested: usize) -> String {
    render_slots(location_name, &forecast_days(daily, requested))
}

/// One slot per rendered day; `None` where the day could not be read
#[must_use]
pub fn forecast_days(daily: &DailyData, requested: usize) -> Vec<Option<ForecastDay>> {
    let count = requested.min(daily.time.len());
    (0..count).map(|i| forecast_day(daily, i)).collect()
}

fn forecast_day(daily: &DailyData, index: usize) -> Option<ForecastDay> {
    let date = NaiveDate::parse_from_str(daily.time.get(index)?, "%Y-%m-%d").ok()?;
    Some(ForecastDay {
        date,
        temp_max_c: value_at(&daily.temperature_max, index)?,
        temp_min_c: value_at(&daily.temperature_min, index)?,
        weather_code: value_at(&daily.weather_code, index)?,
        precipitation_mm: value_at(&daily.precipitation, index).unwrap_or(0.0),
        wind_max_kmh: value_at(&daily.wind_speed_max, index).unwrap_or(0.0),
        wind_gusts_kmh: value_at(&daily.wind_gusts_max, index).unwrap_or(0.0),
    })
}

fn render_slots(location_name: &str, slots: &[Option<ForecastDay>]) -> String {
    let mut lines = vec![
        format!("{}-day weather forecast for {location_name}:", slots.len()),
        String::new(),
    ];

    for (i, slot) in slots.iter().enumerate() {
        match slot {
            Some(day) => lines.push(render_day(day)),
            None => lines.push(format!("📅 Day {}: Error processing day data", i + 1)),
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render one day block
#[must_use]
pub fn render_day(day: &ForecastDay) -> String {
    let mut text = format!(
        "📅 {}: {}",
        day.date.format("%a, %b %d"),
        weather_code_to_description(day.weather_code)
    );
    text.push_str(&format!(
        "\n   🌡️  {:.1}°C to {:.1}°C",
        day.temp_min_c, day.temp_max_c
    ));

    if day.precipitation_mm > 0.0 {
        text.push_str(&format!("\n   🌧️  Rain: {:.1}mm", day.precipitation_mm));
    }

    if day.wind_max_kmh > 0.0 {
        text.push_str(&format!("\n   💨 Wind: {:.1} km/h", day.wind_max_kmh));
        if day.wind_gusts_kmh > 0.0 {
            text.push_str(&format!(" (gusts {:.1} km/h)", day.wind_gusts_kmh));
        }
    }

    if let Some(advisory) = day.advisory() {
        text.push_str("\n   ");
        text.push_str(advisory.message());
    }

    text
}

/// Render the current-conditions report
#[must_use]
pub fn current_report(location_name: &str, current: &CurrentConditions) -> String {
    let feels_like = current
        .apparent_c
        .map(|t| format!(" (feels like {t:.1}°C)"))
        .unwrap_or_default();
    let humidity = current
        .humidity_pct
        .map_or_else(|| "n/a".to_string(), |h| format!("{h:.0}%"));
    let wind = match (current.wind_speed_kmh, current.wind_direction_deg) {
        (Some(speed), Some(direction)) => {
            format!("{speed:.1} km/h from {}", wind_direction_to_compass(direction))
        }
        (Some(speed), None) => format!("{speed:.1} km/h"),
        _ => "n/a".to_string(),
    };
    let pressure = current
        .pressure_hpa
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:.1} hPa"));

    format!(
        "Current weather in {location_name}:\n\
         - Temperature: {:.1}°C{feels_like}\n\
         - Conditions: {}\n\
         - Humidity: {humidity}\n\
         - Wind: {wind}\n\
         - Pressure: {pressure}\n\
         - Last updated: {}",
        current.temperature_c,
        current.description(),
        current.time
    )
}
