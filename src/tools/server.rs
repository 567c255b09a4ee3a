//! In-process tool dispatcher

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::catalog::{
    self, GET_DAYLIGHT_TIMES, GET_DRIVING_DISTANCE, GET_FORECAST, GET_WEATHER, PLAN_ROAD_TRIP,
    SEARCH_ROUTES,
};
use super::{CallParams, METHOD_CALL, METHOD_LIST, ToolRequest, ToolResponse, ToolTransport};
use crate::config::{AppConfig, FeatureSet};
use crate::daylight::{self, DaylightSource};
use crate::geocoding::Geocoder;
use crate::routing::{self, DrivingPlanner, OpenRouteService};
use crate::trails::{self, TrailQuery};
use crate::weather::{self, WeatherClient, WeatherProvider};
use crate::{AdventureError, Result};

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "Highland Planner Tools";

#[derive(Debug, Deserialize)]
struct LocationArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
struct ForecastArgs {
    location: String,
    days: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct DaylightArgs {
    location: String,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DrivingArgs {
    from_location: String,
    to_location: String,
    #[serde(default)]
    waypoints: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RoadTripArgs {
    locations: Vec<String>,
    start_location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RouteSearchArgs {
    search_term: Option<String>,
    region: Option<String>,
    difficulty: Option<u8>,
    hill_type: Option<String>,
    max_results: Option<usize>,
}

/// Runs the enabled tools against live providers
#[derive(Clone)]
pub struct ToolServer {
    features: FeatureSet,
    geocoder: Geocoder,
    weather: Arc<dyn WeatherProvider>,
    daylight: Arc<dyn DaylightSource>,
    driving: DrivingPlanner,
}

impl ToolServer {
    pub fn new(
        features: FeatureSet,
        geocoder: Geocoder,
        weather: Arc<dyn WeatherProvider>,
        daylight: Arc<dyn DaylightSource>,
        driving: DrivingPlanner,
    ) -> Self {
        Self {
            features,
            geocoder,
            weather,
            daylight,
            driving,
        }
    }

    /// Wire every provider from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let providers = &config.providers;
        let geocoder = Geocoder::from_config(providers)?;
        let router = Arc::new(OpenRouteService::from_config(providers)?);
        let driving = DrivingPlanner::new(
            geocoder.clone(),
            router,
            config.assistant.max_trip_locations,
        );
        Ok(Self::new(
            config.assistant.features,
            geocoder,
            Arc::new(WeatherClient::from_config(providers)?),
            Arc::from(daylight::source_from_config(providers)?),
            driving,
        ))
    }

    #[must_use]
    pub fn features(&self) -> FeatureSet {
        self.features
    }

    /// Answer one envelope; never fails, errors become `{"error": ...}`
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle(&self, request: ToolRequest) -> ToolResponse {
        match request.method.as_str() {
            METHOD_LIST => ToolResponse::Tools {
                tools: catalog::definitions(self.features),
            },
            METHOD_CALL => {
                let params = request.params.unwrap_or_else(|| CallParams {
                    name: String::new(),
                    arguments: Map::new(),
                });
                self.call(&params.name, params.arguments).await
            }
            other => ToolResponse::error(format!("Unsupported method: {other}")),
        }
    }

    async fn call(&self, name: &str, arguments: Map<String, Value>) -> ToolResponse {
        if !catalog::is_enabled(self.features, name) {
            warn!("Rejected call to unknown tool '{}'", name);
            return ToolResponse::error(format!("Unknown tool: {name}"));
        }

        match self.dispatch(name, arguments).await {
            Ok(text) => {
                info!("Tool {} returned {} characters", name, text.len());
                ToolResponse::text(text)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResponse::error(error_text(name, &e))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        match name {
            GET_WEATHER => {
                let args: LocationArgs = parse_args(name, arguments)?;
                let place = self.geocoder.resolve(&args.location).await?;
                let current = self.weather.current(place.latitude, place.longitude).await?;
                Ok(weather::current_report(&place.display_name, &current))
            }
            GET_FORECAST => {
                let args: ForecastArgs = parse_args(name, arguments)?;
                let days = weather::clamp_forecast_days(args.days);
                let place = self.geocoder.resolve(&args.location).await?;
                let daily = self
                    .weather
                    .daily(place.latitude, place.longitude, days)
                    .await?;
                Ok(weather::summarize_daily(
                    &place.display_name,
                    &daily,
                    usize::from(days),
                ))
            }
            GET_DAYLIGHT_TIMES => {
                let args: DaylightArgs = parse_args(name, arguments)?;
                let date = parse_date(args.date.as_deref())?;
                let place = self.geocoder.resolve(&args.location).await?;
                let times = self
                    .daylight
                    .times(place.latitude, place.longitude, date)
                    .await?;
                Ok(daylight::daylight_report(&args.location, &times))
            }
            GET_DRIVING_DISTANCE => {
                let args: DrivingArgs = parse_args(name, arguments)?;
                let (stops, route) = self
                    .driving
                    .driving_distance(&args.from_location, &args.to_location, &args.waypoints)
                    .await?;
                Ok(routing::driving_report(&stops, &route))
            }
            PLAN_ROAD_TRIP => {
                let args: RoadTripArgs = parse_args(name, arguments)?;
                let plan = self
                    .driving
                    .plan_road_trip(&args.locations, args.start_location.as_deref())
                    .await?;
                Ok(routing::road_trip_report(&plan))
            }
            SEARCH_ROUTES => {
                let args: RouteSearchArgs = parse_args(name, arguments)?;
                let query = TrailQuery {
                    search_term: args.search_term,
                    region: args.region,
                    difficulty: args.difficulty,
                    hill_type: args.hill_type,
                    max_results: args.max_results,
                };
                let routes = trails::search(&query);
                Ok(trails::search_report(&query, &routes))
            }
            other => Err(AdventureError::invalid_input(format!("Unknown tool: {other}"))),
        }
    }
}

#[async_trait]
impl ToolTransport for ToolServer {
    async fn send(&self, request: ToolRequest) -> Result<ToolResponse> {
        Ok(self.handle(request).await)
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| AdventureError::invalid_input(format!("Invalid arguments for {tool}: {e}")))
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AdventureError::invalid_input(format!("Invalid date '{date}'. Use YYYY-MM-DD format."))
        }),
        None => Ok(daylight::uk_today()),
    }
}

/// Text of an `{"error": ...}` envelope
fn error_text(tool: &str, err: &AdventureError) -> String {
    match err {
        AdventureError::LocationNotFound { .. } => err.user_message(),
        AdventureError::InvalidInput { message } => message.clone(),
        AdventureError::ProviderUnavailable { provider, message } => {
            format!("Failed to fetch {provider} data: {message}")
        }
        AdventureError::MalformedUpstreamData { provider, message } => {
            format!("Unexpected {provider} data format: {message}")
        }
        _ => format!("Error in {tool}: {err}"),
    }
}
