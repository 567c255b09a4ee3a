//! Shared stubs for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use highland_planner::config::FeatureSet;
use highland_planner::daylight::SolarCalculator;
use highland_planner::geocoding::{GeocodeCandidate, GeocodingProvider};
use highland_planner::llm::{ChatMessage, LlmClient, LlmReply};
use highland_planner::models::CurrentConditions;
use highland_planner::routing::{DrivingPlanner, RouteSummary, RoutingProvider};
use highland_planner::tools::ToolDefinition;
use highland_planner::weather::{DailyData, WeatherProvider};
use highland_planner::{Geocoder, Result, ToolServer};

/// Knows a handful of Scottish places
pub struct Gazetteer;

#[async_trait]
impl GeocodingProvider for Gazetteer {
    async fn search(&self, name: &str) -> Result<Vec<GeocodeCandidate>> {
        let (latitude, longitude) = match name {
            "Aviemore" => (57.19, -3.83),
            "Glasgow" => (55.86, -4.25),
            "Glencoe" => (56.68, -5.10),
            "Oban" => (56.41, -5.47),
            "Fort William" => (56.82, -5.11),
            _ => return Ok(Vec::new()),
        };
        Ok(vec![GeocodeCandidate {
            name: name.to_string(),
            latitude,
            longitude,
            country: Some("United Kingdom".to_string()),
            admin1: Some("Scotland".to_string()),
            admin2: None,
            population: None,
        }])
    }
}

/// Every leg is 150 km and just under three hours
pub struct StraightRoad;

#[async_trait]
impl RoutingProvider for StraightRoad {
    async fn route(&self, points: &[(f64, f64)]) -> Result<RouteSummary> {
        Ok(RouteSummary {
            distance_km: 150.0,
            duration_minutes: 170,
            geometry: points.to_vec(),
        })
    }
}

/// A bright, breezy day wherever you ask
pub struct FairWeather;

#[async_trait]
impl WeatherProvider for FairWeather {
    async fn current(&self, _latitude: f64, _longitude: f64) -> Result<CurrentConditions> {
        Ok(CurrentConditions {
            time: "2024-06-15T10:00".to_string(),
            temperature_c: 15.3,
            apparent_c: Some(13.8),
            humidity_pct: Some(64.0),
            weather_code: 1,
            wind_speed_kmh: Some(14.0),
            wind_direction_deg: Some(270.0),
            pressure_hpa: Some(1018.0),
        })
    }

    async fn daily(&self, _latitude: f64, _longitude: f64, days: u8) -> Result<DailyData> {
        let days = usize::from(days);
        Ok(DailyData {
            time: (0..days).map(|d| format!("2024-06-{:02}", 15 + d)).collect(),
            temperature_max: Some(vec![Some(17.0); days]),
            temperature_min: Some(vec![Some(9.0); days]),
            weather_code: Some(vec![Some(2); days]),
            wind_speed_max: Some(vec![Some(20.0); days]),
            ..DailyData::default()
        })
    }
}

/// Tool server over stub providers
pub fn tool_server(features: FeatureSet) -> ToolServer {
    let geocoder = Geocoder::new(Arc::new(Gazetteer));
    let driving = DrivingPlanner::new(geocoder.clone(), Arc::new(StraightRoad), 5);
    ToolServer::new(
        features,
        geocoder,
        Arc::new(FairWeather),
        Arc::new(SolarCalculator),
        driving,
    )
}

/// Replays scripted replies in order and records each prompt
pub struct ScriptedLlm {
    replies: Mutex<Vec<Result<LlmReply>>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    /// Number of tools offered with each prompt
    pub offered: Mutex<Vec<usize>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Result<LlmReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            seen: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        })
    }

    pub fn text(replies: &[&str]) -> Arc<Self> {
        Self::new(
            replies
                .iter()
                .map(|reply| Ok(LlmReply::Text((*reply).to_string())))
                .collect(),
        )
    }

    /// Content of the last message in the `n`th prompt
    pub fn last_user_message(&self, n: usize) -> String {
        let seen = self.seen.lock().unwrap();
        seen[n].last().unwrap().content.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<LlmReply> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.offered.lock().unwrap().push(tools.len());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(LlmReply::Text(String::new())))
    }
}
