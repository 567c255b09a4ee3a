//! Current conditions model and weather lookup tables

use serde::{Deserialize, Serialize};

/// Instant reading for one place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    /// Local observation time as reported upstream (`YYYY-MM-DDTHH:MM`)
    pub time: String,
    /// Temperature in Celsius
    pub temperature_c: f64,
    /// Apparent ("feels like") temperature in Celsius
    pub apparent_c: Option<f64>,
    /// Relative humidity percentage
    pub humidity_pct: Option<f64>,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Wind speed in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Wind direction in degrees (0-360, where 0/360 is North)
    pub wind_direction_deg: Option<f64>,
    /// Mean sea level pressure in hPa
    pub pressure_hpa: Option<f64>,
}

impl CurrentConditions {
    /// Human-readable description of the weather code
    #[must_use]
    pub fn description(&self) -> &'static str {
        weather_code_to_description(self.weather_code)
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Convert wind direction in degrees to a 16-point compass label
#[must_use]
pub fn wind_direction_to_compass(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "Unknown";
    }
    // 22.5 degree sectors centred on each point
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % 16;
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    POINTS[index]
}
