//! Configuration management for the Highland Planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AdventureError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// External data provider endpoints
    #[serde(default)]
    pub providers: ProviderConfig,
    /// Chat completion endpoint and sampling parameters
    #[serde(default)]
    pub llm: LlmConfig,
    /// Dialogue orchestration limits and enabled features
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tool server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// External data provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Base URL of the weather forecast endpoint
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    /// Base URL of the sunrise/sunset endpoint
    #[serde(default = "default_daylight_url")]
    pub daylight_url: String,
    /// Where daylight times come from: "api" or "solar"
    #[serde(default = "default_daylight_backend")]
    pub daylight_backend: String,
    /// Base URL of the routing service
    #[serde(default = "default_routing_url")]
    pub routing_url: String,
    /// Routing service API key
    pub routing_api_key: Option<String>,
    /// Remote tool server (`.../mcp`); tools run in-process when unset
    pub tool_server_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
}

/// Chat completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Bearer token for the completion endpoint
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    /// Offer the weather tools to the model when no weather was prefetched
    #[serde(default = "default_true")]
    pub offer_tools: bool,
    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u32,
}

/// Which data categories the assistant may fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    #[serde(default = "default_true")]
    pub weather: bool,
    #[serde(default = "default_true")]
    pub daylight: bool,
    #[serde(default = "default_true")]
    pub driving: bool,
    #[serde(default = "default_true")]
    pub routes: bool,
}

/// Dialogue orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub features: FeatureSet,
    /// Places fetched per turn for weather and daylight
    #[serde(default = "default_max_weather_locations")]
    pub max_weather_locations: usize,
    /// Stops accepted by a multi-stop road trip
    #[serde(default = "default_max_trip_locations")]
    pub max_trip_locations: usize,
    /// Characters kept from each fetched context blob
    #[serde(default = "default_context_char_budget")]
    pub context_char_budget: usize,
    /// Past exchanges replayed into the prompt
    #[serde(default = "default_history_exchanges")]
    pub history_exchanges: usize,
    /// Exchanges retained in the session
    #[serde(default = "default_max_stored_exchanges")]
    pub max_stored_exchanges: usize,
    /// Distinct places remembered in the session
    #[serde(default = "default_max_discussed_locations")]
    pub max_discussed_locations: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP endpoint for span export
    pub otlp_endpoint: Option<String>,
}

/// Tool server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_daylight_url() -> String {
    "https://api.sunrise-sunset.org/json".to_string()
}

fn default_daylight_backend() -> String {
    "api".to_string()
}

fn default_routing_url() -> String {
    "https://api.openrouteservice.org/v2/directions/driving-car".to_string()
}

fn default_provider_timeout() -> u32 {
    30
}

fn default_llm_base_url() -> String {
    "https://api.studio.nebius.ai/v1".to_string()
}

fn default_llm_model() -> String {
    "meta-llama/Meta-Llama-3.1-8B-Instruct".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    600
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

fn default_max_weather_locations() -> usize {
    2
}

fn default_max_trip_locations() -> usize {
    5
}

fn default_context_char_budget() -> usize {
    1500
}

fn default_history_exchanges() -> usize {
    3
}

fn default_max_stored_exchanges() -> usize {
    6
}

fn default_max_discussed_locations() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            weather_url: default_weather_url(),
            daylight_url: default_daylight_url(),
            daylight_backend: default_daylight_backend(),
            routing_url: default_routing_url(),
            routing_api_key: None,
            tool_server_url: None,
            timeout_seconds: default_provider_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            offer_tools: true,
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            weather: true,
            daylight: true,
            driving: true,
            routes: true,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            features: FeatureSet::default(),
            max_weather_locations: default_max_weather_locations(),
            max_trip_locations: default_max_trip_locations(),
            context_char_budget: default_context_char_budget(),
            history_exchanges: default_history_exchanges(),
            max_stored_exchanges: default_max_stored_exchanges(),
            max_discussed_locations: default_max_discussed_locations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // HIGHLAND_LLM__MODEL -> llm.model
        builder = builder.add_source(
            Environment::with_prefix("HIGHLAND")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.apply_key_fallbacks();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("highland-planner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.providers.geocoding_url.is_empty() {
            self.providers.geocoding_url = default_geocoding_url();
        }
        if self.providers.weather_url.is_empty() {
            self.providers.weather_url = default_weather_url();
        }
        if self.providers.daylight_url.is_empty() {
            self.providers.daylight_url = default_daylight_url();
        }
        if self.providers.routing_url.is_empty() {
            self.providers.routing_url = default_routing_url();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_provider_timeout();
        }
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.max_tokens == 0 {
            self.llm.max_tokens = default_max_tokens();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.assistant.context_char_budget == 0 {
            self.assistant.context_char_budget = default_context_char_budget();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
    }

    /// Pick up provider keys from their conventional environment variables
    fn apply_key_fallbacks(&mut self) {
        if self.providers.routing_api_key.is_none() {
            self.providers.routing_api_key = std::env::var("OPENROUTESERVICE_API_KEY").ok();
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("NEBIUS_API_KEY")
                .or_else(|_| std::env::var("LLM_API_KEY"))
                .ok();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Routing", &self.providers.routing_api_key),
            ("LLM", &self.llm.api_key),
        ] {
            if let Some(key) = key {
                if key.trim().is_empty() {
                    return Err(AdventureError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }
                if key.len() > 512 {
                    return Err(AdventureError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.timeout_seconds > 300 {
            return Err(AdventureError::config("Provider timeout cannot exceed 300 seconds").into());
        }

        if self.llm.timeout_seconds > 600 {
            return Err(AdventureError::config("LLM timeout cannot exceed 600 seconds").into());
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(
                AdventureError::config("LLM temperature must be between 0.0 and 2.0").into(),
            );
        }

        if let Some(top_p) = self.llm.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(AdventureError::config("LLM top_p must be between 0.0 and 1.0").into());
        }

        if self.llm.max_tokens > 4096 {
            return Err(AdventureError::config("LLM max_tokens cannot exceed 4096").into());
        }

        if !(1..=5).contains(&self.assistant.max_weather_locations) {
            return Err(AdventureError::config(
                "Weather locations per turn must be between 1 and 5",
            )
            .into());
        }

        if !(2..=5).contains(&self.assistant.max_trip_locations) {
            return Err(
                AdventureError::config("Road trip locations must be between 2 and 5").into(),
            );
        }

        if self.assistant.context_char_budget > 20_000 {
            return Err(AdventureError::config(
                "Context character budget cannot exceed 20000",
            )
            .into());
        }

        if self.assistant.history_exchanges > self.assistant.max_stored_exchanges {
            return Err(AdventureError::config(
                "history_exchanges cannot exceed max_stored_exchanges",
            )
            .into());
        }

        if self.assistant.max_discussed_locations == 0 {
            return Err(
                AdventureError::config("max_discussed_locations must be at least 1").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AdventureError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AdventureError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_backends = ["api", "solar"];
        if !valid_backends.contains(&self.providers.daylight_backend.as_str()) {
            return Err(AdventureError::config(format!(
                "Invalid daylight backend '{}'. Must be one of: {}",
                self.providers.daylight_backend,
                valid_backends.join(", ")
            ))
            .into());
        }

        let mut urls = vec![
            ("Geocoding", self.providers.geocoding_url.as_str()),
            ("Weather", self.providers.weather_url.as_str()),
            ("Daylight", self.providers.daylight_url.as_str()),
            ("Routing", self.providers.routing_url.as_str()),
            ("LLM", self.llm.base_url.as_str()),
        ];
        if let Some(url) = &self.providers.tool_server_url {
            urls.push(("Tool server", url.as_str()));
        }
        if let Some(url) = &self.logging.otlp_endpoint {
            urls.push(("OTLP", url.as_str()));
        }
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AdventureError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
