//! Driving distances and multi-stop road trips (OpenRouteService)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::geocoding::Geocoder;
use crate::http::{build_client, ensure_success, read_json};
use crate::polyline;
use crate::{AdventureError, Result};

const PROVIDER: &str = "routing";
/// Intermediate stops accepted by a two-point route
pub const MAX_WAYPOINTS: usize = 3;

/// One driven route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub distance_km: f64,
    pub duration_minutes: u64,
    /// Decoded `(lat, lon)` path
    pub geometry: Vec<(f64, f64)>,
}

/// Computes a driving route through ordered `(lat, lon)` points
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, points: &[(f64, f64)]) -> Result<RouteSummary>;
}

/// OpenRouteService directions client
pub struct OpenRouteService {
    client: Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    summary: DirectionsSummary,
    geometry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DirectionsSummary {
    /// metres
    distance: Option<f64>,
    /// seconds
    duration: Option<f64>,
}

impl OpenRouteService {
    pub fn new(client: Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Ok(Self::new(
            build_client(config.timeout_seconds)?,
            config.routing_url.clone(),
            config.routing_api_key.clone(),
        ))
    }
}

fn to_summary(route: DirectionsRoute) -> RouteSummary {
    let geometry = route
        .geometry
        .as_deref()
        .map(polyline::decode)
        .unwrap_or_default();
    let distance_km = match route.summary.distance {
        Some(metres) => metres / 1000.0,
        None => polyline::path_length_km(&geometry),
    };
    RouteSummary {
        distance_km,
        duration_minutes: (route.summary.duration.unwrap_or(0.0) / 60.0).round() as u64,
        geometry,
    }
}

#[async_trait]
impl RoutingProvider for OpenRouteService {
    #[instrument(skip(self, points), fields(stops = points.len()))]
    async fn route(&self, points: &[(f64, f64)]) -> Result<RouteSummary> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AdventureError::config("Routing API key not set (OPENROUTESERVICE_API_KEY)")
        })?;

        // ORS expects [lon, lat]
        let coordinates: Vec<[f64; 2]> = points.iter().map(|(lat, lon)| [*lon, *lat]).collect();
        let body = json!({
            "coordinates": coordinates,
            "radiuses": vec![-1; coordinates.len()],
            "instructions": false,
        });
        debug!("Routing request: {}", body);

        let response = ensure_success(
            self.client
                .post(&self.url)
                .header("Authorization", api_key)
                .json(&body)
                .send()
                .await,
            PROVIDER,
        )?;
        let directions: DirectionsResponse = read_json(response, PROVIDER).await?;
        let route = directions
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| {
                AdventureError::malformed(PROVIDER, "No route found between these locations")
            })?;
        Ok(to_summary(route))
    }
}

/// "2h 5m" or "45m"
#[must_use]
pub fn format_duration(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

/// A completed road trip
#[derive(Debug, Clone)]
pub struct TripPlan {
    pub stops: Vec<String>,
    pub segments: Vec<(String, String, RouteSummary)>,
}

impl TripPlan {
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.segments.iter().map(|(_, _, s)| s.distance_km).sum()
    }

    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.segments.iter().map(|(_, _, s)| s.duration_minutes).sum()
    }

    /// Segment paths joined end to end
    #[must_use]
    pub fn geometry(&self) -> Vec<(f64, f64)> {
        self.segments
            .iter()
            .flat_map(|(_, _, s)| s.geometry.iter().copied())
            .collect()
    }
}

/// Render a two-point (plus waypoints) route
#[must_use]
pub fn driving_report(stops: &[String], route: &RouteSummary) -> String {
    format!(
        "🚗 **Driving Route: {}**\n\n\
         **Distance:** {:.1} km\n\
         **Estimated Time:** {}\n\n\
         **Route Tips:**\n\
         • Plan for rest stops every 2 hours on longer journeys\n\
         • Check for roadworks or closures before you travel\n\
         • Single-track roads common in Highlands - allow extra time\n\
         • Consider ferry times if traveling to islands\n\n\
         **Fuel & Facilities:**\n\
         • Fill up before heading into remote areas\n\
         • Services can be limited in the Highlands\n\
         • Check opening hours for petrol stations in rural areas",
        stops.join(" → "),
        route.distance_km,
        format_duration(route.duration_minutes)
    )
}

/// Render a multi-stop trip
#[must_use]
pub fn road_trip_report(plan: &TripPlan) -> String {
    let breakdown = plan
        .segments
        .iter()
        .map(|(from, to, s)| {
            format!(
                "• {from} → {to}: {:.1}km ({})",
                s.distance_km,
                format_duration(s.duration_minutes)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🗺️ **Scottish Road Trip Plan**\n\n\
         **Total Route:** {}\n\n\
         **Journey Breakdown:**\n{breakdown}\n\n\
         **Total Distance:** {:.1} km\n\
         **Total Driving Time:** {}\n\n\
         **Planning Tips:**\n\
         • Add 25% extra time for Highland roads and stops\n\
         • Book accommodation in advance, especially in summer\n\
         • Check ferry schedules for island destinations\n\
         • Consider splitting longer journeys over multiple days\n\
         • Pack snacks and water for remote areas\n\n\
         **Recommended Daily Limits:**\n\
         • Highland roads: 200-250km per day max\n\
         • Island hopping: Plan for ferry times\n\
         • City to city: 300-400km comfortable",
        plan.stops.join(" → "),
        plan.total_distance_km(),
        format_duration(plan.total_minutes())
    )
}

/// Geocodes stops and asks the routing provider for each leg
#[derive(Clone)]
pub struct DrivingPlanner {
    geocoder: Geocoder,
    router: Arc<dyn RoutingProvider>,
    max_trip_locations: usize,
}

impl DrivingPlanner {
    pub fn new(
        geocoder: Geocoder,
        router: Arc<dyn RoutingProvider>,
        max_trip_locations: usize,
    ) -> Self {
        Self {
            geocoder,
            router,
            max_trip_locations,
        }
    }

    /// Route from `from` to `to` through up to three waypoints.
    /// Waypoints that cannot be resolved are skipped.
    #[instrument(skip(self))]
    pub async fn driving_distance(
        &self,
        from: &str,
        to: &str,
        waypoints: &[String],
    ) -> Result<(Vec<String>, RouteSummary)> {
        let origin = self.geocoder.resolve(from).await?;
        let destination = self.geocoder.resolve(to).await?;

        let mut labels = vec![from.to_string()];
        let mut points = vec![(origin.latitude, origin.longitude)];
        for waypoint in waypoints.iter().take(MAX_WAYPOINTS) {
            match self.geocoder.resolve(waypoint).await {
                Ok(stop) => {
                    labels.push(waypoint.clone());
                    points.push((stop.latitude, stop.longitude));
                }
                Err(e) => warn!("Skipping waypoint '{}': {}", waypoint, e),
            }
        }
        labels.push(to.to_string());
        points.push((destination.latitude, destination.longitude));

        let route = self.router.route(&points).await?;
        info!(
            "Route {} covers {:.1} km in {} minutes",
            labels.join(" -> "),
            route.distance_km,
            route.duration_minutes
        );
        Ok((labels, route))
    }

    /// Plan consecutive legs through `locations`, optionally from a separate start
    #[instrument(skip(self))]
    pub async fn plan_road_trip(
        &self,
        locations: &[String],
        start: Option<&str>,
    ) -> Result<TripPlan> {
        if locations.len() > self.max_trip_locations {
            return Err(AdventureError::invalid_input(format!(
                "Maximum {} locations supported",
                self.max_trip_locations
            )));
        }

        let mut stops: Vec<String> = start.map(str::to_string).into_iter().collect();
        stops.extend(locations.iter().cloned());
        if stops.len() < 2 {
            return Err(AdventureError::invalid_input(
                "A road trip needs at least two locations",
            ));
        }

        let mut segments = Vec::with_capacity(stops.len() - 1);
        for pair in stops.windows(2) {
            let (_, route) = self.driving_distance(&pair[0], &pair[1], &[]).await?;
            segments.push((pair[0].clone(), pair[1].clone(), route));
        }

        Ok(TripPlan { stops, segments })
    }
}
