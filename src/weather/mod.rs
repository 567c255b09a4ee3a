//! Weather provider client (Open-Meteo forecast endpoint)

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};

use crate::config::ProviderConfig;
use crate::http::{build_client, ensure_success, read_json};
use crate::models::CurrentConditions;
use crate::{AdventureError, Result};

pub mod openmeteo;
pub mod summary;

pub use openmeteo::DailyData;
pub use summary::{current_report, forecast_days, render_day, summarize, summarize_daily};

const PROVIDER: &str = "weather";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m,pressure_msl";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weather_code,precipitation_sum,wind_speed_10m_max,wind_gusts_10m_max";
const TIMEZONE: &str = "Europe/London";

/// Default and bounds for multi-day requests
pub const DEFAULT_FORECAST_DAYS: u8 = 3;
pub const MAX_FORECAST_DAYS: u8 = 7;

/// Clamp a requested day count into 1..=7, defaulting to 3
#[must_use]
pub fn clamp_forecast_days(days: Option<i64>) -> u8 {
    match days {
        Some(days) => days.clamp(1, i64::from(MAX_FORECAST_DAYS)) as u8,
        None => DEFAULT_FORECAST_DAYS,
    }
}

/// Source of current conditions and daily forecasts
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Instant reading for a point
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions>;

    /// `days` (1..=7) of daily aggregates for a point
    async fn daily(&self, latitude: f64, longitude: f64, days: u8) -> Result<DailyData>;
}

/// Open-Meteo forecast endpoint client
pub struct WeatherClient {
    client: Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self::new(
            build_client(config.timeout_seconds)?,
            config.weather_url.clone(),
        ))
    }

    async fn fetch(&self, url: &str) -> Result<openmeteo::ForecastResponse> {
        debug!("Weather request URL: {}", url);
        let response = ensure_success(self.client.get(url).send().await, PROVIDER)?;
        read_json(response, PROVIDER).await
    }
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    #[instrument(skip(self))]
    async fn current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        let url = format!(
            "{}?latitude={latitude}&longitude={longitude}&current={CURRENT_FIELDS}&timezone={}",
            self.base_url,
            urlencoding::encode(TIMEZONE)
        );
        let response = self.fetch(&url).await?;
        let current = response.current.ok_or_else(|| {
            AdventureError::malformed(PROVIDER, "No current weather data available")
        })?;
        info!("Retrieved current weather for {:.4}, {:.4}", latitude, longitude);
        Ok(current.into())
    }

    #[instrument(skip(self))]
    async fn daily(&self, latitude: f64, longitude: f64, days: u8) -> Result<DailyData> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let url = format!(
            "{}?latitude={latitude}&longitude={longitude}&daily={DAILY_FIELDS}\
             &timezone={}&forecast_days={days}",
            self.base_url,
            urlencoding::encode(TIMEZONE)
        );
        let response = self.fetch(&url).await?;
        let daily = response.daily.ok_or_else(|| {
            AdventureError::malformed(PROVIDER, "No daily forecast data available")
        })?;
        info!(
            "Retrieved {} forecast days for {:.4}, {:.4}",
            daily.time.len(),
            latitude,
            longitude
        );
        Ok(daily)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::routing::get;
    use rstest::rstest;
    use serde_json::{Value, json};

    /// Serve `body` at `/v1/forecast` on an ephemeral port
    async fn forecast_endpoint(body: Value) -> String {
        let app = axum::Router::new().route(
            "/v1/forecast",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/v1/forecast")
    }

    #[tokio::test]
    async fn test_current_from_endpoint() {
        let url = forecast_endpoint(json!({
            "current": {
                "time": "2024-06-12T14:00",
                "temperature_2m": 11.5,
                "weather_code": 61,
                "wind_speed_10m": 22.0
            }
        }))
        .await;
        let current = WeatherClient::new(Client::new(), url)
            .current(57.19, -3.83)
            .await
            .unwrap();
        assert_eq!(current.weather_code, 61);
        assert_eq!(current.wind_speed_kmh, Some(22.0));
        assert_eq!(current.humidity_pct, None);
    }

    #[tokio::test]
    async fn test_missing_daily_block_is_malformed() {
        let url = forecast_endpoint(json!({"latitude": 57.19})).await;
        let err = WeatherClient::new(Client::new(), url)
            .daily(57.19, -3.83, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AdventureError::MalformedUpstreamData { .. }));
    }

    #[rstest]
    #[case(None, 3)]
    #[case(Some(1), 1)]
    #[case(Some(5), 5)]
    #[case(Some(0), 1)]
    #[case(Some(-4), 1)]
    #[case(Some(30), 7)]
    fn test_clamp_forecast_days(#[case] requested: Option<i64>, #[case] expected: u8) {
        assert_eq!(clamp_forecast_days(requested), expected);
    }
}
