//! Error types and handling for the Highland Planner

use thiserror::Error;

/// Main error type for the Highland Planner
#[derive(Error, Debug)]
pub enum AdventureError {
    /// The geocoder found no usable candidate for a place name
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },

    /// Network failure, timeout or non-2xx status from an external provider
    #[error("{provider} unavailable: {message}")]
    ProviderUnavailable { provider: String, message: String },

    /// An expected field was missing from a provider response
    #[error("Malformed data from {provider}: {message}")]
    MalformedUpstreamData { provider: String, message: String },

    /// Model output judged corrupt by the output validator
    #[error("Generated reply rejected: {reason}")]
    ValidationFailure { reason: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl AdventureError {
    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new malformed-data error
    pub fn malformed<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::MalformedUpstreamData {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a new output validation error
    pub fn validation_failure<S: Into<String>>(reason: S) -> Self {
        Self::ValidationFailure {
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AdventureError::LocationNotFound { query } => {
                format!("Could not find location: {query}")
            }
            AdventureError::ProviderUnavailable { provider, .. } => {
                format!(
                    "Unable to reach the {provider} service right now. Please try again shortly."
                )
            }
            AdventureError::MalformedUpstreamData { provider, .. } => {
                format!("The {provider} service returned data I couldn't read.")
            }
            AdventureError::ValidationFailure { .. } => {
                "I had trouble putting that answer together. Could you rephrase the question?"
                    .to_string()
            }
            AdventureError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AdventureError::InvalidInput { message } => format!("Invalid input: {message}"),
        }
    }
}

impl From<reqwest::Error> for AdventureError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AdventureError::malformed("http", err.to_string())
        } else {
            AdventureError::provider("http", err.to_string())
        }
    }
}
