//! Place name resolution with a Scottish bias
//!
//! Free text is resolved to coordinates in three steps: literal `"lat,lon"`
//! input short-circuits; otherwise the geocoding provider is asked for up to
//! ten candidates; the candidates are scored (see [`scoring`]) and the first
//! highest-scoring one wins.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::http::{build_client, ensure_success, read_json};
use crate::models::GeocodeResult;
use crate::models::location::parse_coordinates;
use crate::{AdventureError, Result};

pub mod preferences;
pub mod scoring;

pub use scoring::{GeocodeCandidate, score_candidate, select_best};

const PROVIDER: &str = "geocoding";
const CANDIDATE_COUNT: u32 = 10;

/// Source of geocoding candidates
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn search(&self, name: &str) -> Result<Vec<GeocodeCandidate>>;
}

/// Open-Meteo geocoding search
pub struct OpenMeteoGeocoding {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<GeocodeCandidate>>,
}

impl OpenMeteoGeocoding {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl GeocodingProvider for OpenMeteoGeocoding {
    async fn search(&self, name: &str) -> Result<Vec<GeocodeCandidate>> {
        let url = format!(
            "{}?name={}&count={CANDIDATE_COUNT}&language=en&format=json",
            self.base_url,
            urlencoding::encode(name)
        );
        debug!("Geocoding request URL: {}", url);

        let response = ensure_success(self.client.get(&url).send().await, PROVIDER)?;
        let body: SearchResponse = read_json(response, PROVIDER).await?;
        Ok(body.results.unwrap_or_default())
    }
}

/// Resolves free-text locations
#[derive(Clone)]
pub struct Geocoder {
    provider: Arc<dyn GeocodingProvider>,
}

impl Geocoder {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    /// Geocoder backed by the configured Open-Meteo endpoint
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds)?;
        Ok(Self::new(Arc::new(OpenMeteoGeocoding::new(
            client,
            config.geocoding_url.clone(),
        ))))
    }

    /// Resolve a place name or `"lat,lon"` pair.
    ///
    /// Provider failures and empty candidate lists both surface as
    /// `LocationNotFound`; only blank input is an `InvalidInput` error.
    #[instrument(skip(self))]
    pub async fn resolve(&self, location: &str) -> Result<GeocodeResult> {
        let query = location.trim();
        if query.is_empty() {
            return Err(AdventureError::invalid_input("location must not be empty"));
        }

        if let Some((latitude, longitude)) = parse_coordinates(query) {
            debug!("Using literal coordinates");
            return Ok(GeocodeResult::from_coordinates(latitude, longitude));
        }

        let candidates = match self.provider.search(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Geocoding failed for '{}': {}", query, e);
                return Err(AdventureError::location_not_found(query));
            }
        };

        let Some(index) = select_best(query, &candidates) else {
            warn!("No geocoding candidates for '{}'", query);
            return Err(AdventureError::location_not_found(query));
        };

        let best = &candidates[index];
        let result = GeocodeResult {
            latitude: best.latitude,
            longitude: best.longitude,
            display_name: best.display_name(),
            source_rank: index,
        };
        info!(
            "Resolved '{}' to {} ({:.4}, {:.4}) from {} candidates",
            query,
            result.display_name,
            result.latitude,
            result.longitude,
            candidates.len()
        );
        Ok(result)
    }
}
