//! Highland Planner - conversational outdoor-activity planning for Scotland
//!
//! This library resolves Scottish place names, fetches weather, daylight,
//! driving and hill-walk data behind a small JSON tool protocol, and drives a
//! chat model that turns that data into advice.

pub mod assistant;
pub mod cli;
pub mod config;
pub mod daylight;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod intent;
pub mod llm;
pub mod logging;
pub mod models;
pub mod polyline;
pub mod routing;
pub mod server;
pub mod tools;
pub mod trails;
pub mod weather;

// Re-export core types for public API
pub use assistant::{Assistant, ConversationState};
pub use config::AppConfig;
pub use error::AdventureError;
pub use geocoding::Geocoder;
pub use intent::Intent;
pub use models::{ForecastDay, GeocodeResult};
pub use tools::{ToolRequest, ToolResponse, ToolServer, ToolTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AdventureError>;
