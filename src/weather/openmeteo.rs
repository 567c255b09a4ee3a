//! `OpenMeteo` forecast response structures

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::CurrentConditions;

/// Forecast endpoint response; either section may be absent
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: Option<CurrentData>,
    pub daily: Option<DailyData>,
}

/// Instant reading block
#[derive(Debug, Deserialize)]
pub struct CurrentData {
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
    #[serde(rename = "relative_humidity_2m")]
    pub humidity: Option<f64>,
    #[serde(rename = "apparent_temperature")]
    pub apparent: Option<f64>,
    pub weather_code: u16,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: Option<f64>,
    pub pressure_msl: Option<f64>,
}

impl From<CurrentData> for CurrentConditions {
    fn from(current: CurrentData) -> Self {
        Self {
            time: current.time,
            temperature_c: current.temperature,
            apparent_c: current.apparent,
            humidity_pct: current.humidity,
            weather_code: current.weather_code,
            wind_speed_kmh: current.wind_speed,
            wind_direction_deg: current.wind_direction,
            pressure_hpa: current.pressure_msl,
        }
    }
}

/// Daily arrays indexed by day. Any array may be missing or short, and any
/// element may be null or of the wrong type; such elements read as `None`.
#[derive(Debug, Default, Deserialize)]
pub struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default, deserialize_with = "lenient")]
    pub temperature_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m_min", default, deserialize_with = "lenient")]
    pub temperature_min: Option<Vec<Option<f64>>>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather_code: Option<Vec<Option<u16>>>,
    #[serde(rename = "precipitation_sum", default, deserialize_with = "lenient")]
    pub precipitation: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_speed_10m_max", default, deserialize_with = "lenient")]
    pub wind_speed_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_gusts_10m_max", default, deserialize_with = "lenient")]
    pub wind_gusts_max: Option<Vec<Option<f64>>>,
}

/// Per-element parse: an element that does not fit `T` becomes `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(values.map(|values| {
        values
            .into_iter()
            .map(|value| serde_json::from_value(value).ok())
            .collect()
    }))
}

/// Value at `index`, if the array exists, is long enough and is not null
pub(crate) fn value_at<T: Copy>(values: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    values.as_ref().and_then(|v| v.get(index).copied().flatten())
}
