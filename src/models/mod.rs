//! Data models shared across the planner
//!
//! - Location: resolved places and coordinates
//! - Weather: current conditions and code/compass lookup tables
//! - Forecast: per-day forecast values and their activity advisory

pub mod forecast;
pub mod location;
pub mod weather;

pub use forecast::{Advisory, ForecastDay};
pub use location::GeocodeResult;
pub use weather::{CurrentConditions, weather_code_to_description, wind_direction_to_compass};
