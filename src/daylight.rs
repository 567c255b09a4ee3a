//! Sunrise, sunset and golden-hour planning
//!
//! Times come either from the sunrise-sunset.org API or from a local solar
//! calculation, and are always reported in UK local time (GMT/BST).

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Europe::London;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use tracing::{debug, instrument};

use crate::config::ProviderConfig;
use crate::http::{build_client, ensure_success, read_json};
use crate::{AdventureError, Result};

const PROVIDER: &str = "daylight";

/// Sunrise and sunset for one place and date
#[derive(Debug, Clone, PartialEq)]
pub struct DaylightTimes {
    pub date: NaiveDate,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl DaylightTimes {
    /// Time between sunrise and sunset
    #[must_use]
    pub fn daylight(&self) -> Duration {
        self.sunset - self.sunrise
    }
}

/// Source of sunrise/sunset times
#[async_trait]
pub trait DaylightSource: Send + Sync {
    async fn times(&self, latitude: f64, longitude: f64, date: NaiveDate)
    -> Result<DaylightTimes>;
}

/// sunrise-sunset.org client
pub struct SunriseSunsetApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: Value,
}

impl SunriseSunsetApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

fn parse_event(results: &Value, field: &str) -> Result<DateTime<Utc>> {
    let raw = results
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AdventureError::malformed(PROVIDER, format!("missing {field}")))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AdventureError::malformed(PROVIDER, format!("bad {field} '{raw}': {e}")))
}

#[async_trait]
impl DaylightSource for SunriseSunsetApi {
    #[instrument(skip(self))]
    async fn times(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<DaylightTimes> {
        let url = format!(
            "{}?lat={latitude}&lng={longitude}&date={}&formatted=0",
            self.base_url,
            date.format("%Y-%m-%d")
        );
        debug!("Daylight request URL: {}", url);

        let response = ensure_success(self.client.get(&url).send().await, PROVIDER)?;
        let body: ApiResponse = read_json(response, PROVIDER).await?;
        if body.status != "OK" {
            return Err(AdventureError::malformed(
                PROVIDER,
                format!("status was {}", body.status),
            ));
        }

        Ok(DaylightTimes {
            date,
            sunrise: parse_event(&body.results, "sunrise")?,
            sunset: parse_event(&body.results, "sunset")?,
        })
    }
}

/// Offline solar position calculation
pub struct SolarCalculator;

impl SolarCalculator {
    pub fn compute(latitude: f64, longitude: f64, date: NaiveDate) -> Result<DaylightTimes> {
        let coordinates = Coordinates::new(latitude, longitude).ok_or_else(|| {
            AdventureError::invalid_input(format!(
                "Invalid coordinates: lat={latitude}, lng={longitude}"
            ))
        })?;
        let solar_day = SolarDay::new(coordinates, date);

        let sunrise = solar_day
            .event_time(SolarEvent::Sunrise)
            .ok_or_else(|| AdventureError::malformed("solar", "no sunrise on this date"))?;
        let sunset = solar_day
            .event_time(SolarEvent::Sunset)
            .ok_or_else(|| AdventureError::malformed("solar", "no sunset on this date"))?;

        Ok(DaylightTimes {
            date,
            sunrise,
            sunset,
        })
    }
}

#[async_trait]
impl DaylightSource for SolarCalculator {
    async fn times(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<DaylightTimes> {
        Self::compute(latitude, longitude, date)
    }
}

/// Build the configured daylight backend
pub fn source_from_config(config: &ProviderConfig) -> Result<Box<dyn DaylightSource>> {
    match config.daylight_backend.as_str() {
        "solar" => Ok(Box::new(SolarCalculator)),
        _ => Ok(Box::new(SunriseSunsetApi::new(
            build_client(config.timeout_seconds)?,
            config.daylight_url.clone(),
        ))),
    }
}

/// Today's date in the UK
#[must_use]
pub fn uk_today() -> NaiveDate {
    Utc::now().with_timezone(&London).date_naive()
}

fn local_clock(time: DateTime<Utc>) -> String {
    time.with_timezone(&London).format("%H:%M").to_string()
}

/// Capitalise the first letter of each word
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Render the daylight planning report
#[must_use]
pub fn daylight_report(location: &str, times: &DaylightTimes) -> String {
    let daylight = times.daylight();
    let hours = daylight.num_hours();
    let minutes = daylight.num_minutes() % 60;
    let sunrise = local_clock(times.sunrise);
    let sunset = local_clock(times.sunset);
    let golden_morning = local_clock(times.sunrise + Duration::minutes(30));
    let golden_evening = local_clock(times.sunset - Duration::minutes(60));
    let finish_by = local_clock(times.sunset - Duration::minutes(30));

    format!(
        "🌅 **Daylight Times for {}** ({}):\n\n\
         **Sunrise:** {sunrise}\n\
         **Sunset:** {sunset}\n\
         **Daylight Duration:** {hours}h {minutes}m\n\n\
         **For Photography:**\n\
         • Golden hour morning: Around {golden_morning}\n\
         • Golden hour evening: {golden_evening} - {sunset}\n\n\
         **For Outdoor Activities:**\n\
         • Best light for hiking: After {sunrise}\n\
         • Plan to finish by: {finish_by}\n\
         • Set up camp before: {sunset}",
        title_case(location),
        times.date.format("%Y-%m-%d")
    )
}
