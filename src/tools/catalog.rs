//! Tool names, descriptions and input schemas

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::FeatureSet;

pub const GET_WEATHER: &str = "get_weather";
pub const GET_FORECAST: &str = "get_forecast";
pub const GET_DAYLIGHT_TIMES: &str = "get_daylight_times";
pub const GET_DRIVING_DISTANCE: &str = "get_driving_distance";
pub const PLAN_ROAD_TRIP: &str = "plan_road_trip";
pub const SEARCH_ROUTES: &str = "search_routes";

/// A tool as advertised by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Current conditions and multi-day forecast
#[must_use]
pub fn weather_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            GET_WEATHER,
            "Get current weather for any location worldwide. Ambiguous place names like \
             'Perth' or 'Cambridge' resolve to the UK/Scottish place first.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Location name, coordinates, or landmark. Examples: 'Edinburgh', \
                                        'Perth' (defaults to Scotland), 'Perth, Australia', '55.9533,-3.1883'"
                    }
                },
                "required": ["location"]
            }),
        ),
        tool(
            GET_FORECAST,
            "Get a multi-day weather forecast for trip planning. Ambiguous place names resolve \
             to the UK/Scottish place first.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Location name, coordinates, or landmark"
                    },
                    "days": {
                        "type": "integer",
                        "description": "Number of days to forecast (1-7, default: 3)",
                        "minimum": 1,
                        "maximum": 7,
                        "default": 3
                    }
                },
                "required": ["location"]
            }),
        ),
    ]
}

fn daylight_tools() -> Vec<ToolDefinition> {
    vec![tool(
        GET_DAYLIGHT_TIMES,
        "Get sunrise, sunset, and daylight duration for Scottish locations, for planning \
         outdoor activities, photography, and camping.",
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "Scottish location name (e.g., 'Edinburgh', 'Ben Nevis', 'Skye')"
                },
                "date": {
                    "type": "string",
                    "description": "Date in YYYY-MM-DD format (optional, defaults to today)"
                }
            },
            "required": ["location"]
        }),
    )]
}

fn driving_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            GET_DRIVING_DISTANCE,
            "Calculate driving distance and time between Scottish locations.",
            json!({
                "type": "object",
                "properties": {
                    "from_location": {
                        "type": "string",
                        "description": "Starting location (e.g., 'Edinburgh', 'Fort William')"
                    },
                    "to_location": {
                        "type": "string",
                        "description": "Destination (e.g., 'Aviemore', 'Oban', 'St Andrews')"
                    },
                    "waypoints": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Optional stops along the way (max 3)"
                    }
                },
                "required": ["from_location", "to_location"]
            }),
        ),
        tool(
            PLAN_ROAD_TRIP,
            "Plan a multi-stop road trip through Scottish destinations.",
            json!({
                "type": "object",
                "properties": {
                    "locations": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Locations to visit in order (max 5)"
                    },
                    "start_location": {
                        "type": "string",
                        "description": "Starting point (if different from first location)"
                    }
                },
                "required": ["locations"]
            }),
        ),
    ]
}

fn route_tools() -> Vec<ToolDefinition> {
    vec![tool(
        SEARCH_ROUTES,
        "Search Scottish hill walks by name, region, difficulty, or hill type.",
        json!({
            "type": "object",
            "properties": {
                "search_term": {
                    "type": "string",
                    "description": "Route names, locations, or features (e.g., 'Ben Nevis', 'Cairngorms', 'coastal walks')"
                },
                "region": {
                    "type": "string",
                    "description": "Scottish region (e.g., 'Highlands', 'Borders', 'Trossachs')"
                },
                "difficulty": {
                    "type": "integer",
                    "description": "Route difficulty level (1-5 scale, where 1=easy, 5=very difficult)",
                    "minimum": 1,
                    "maximum": 5
                },
                "hill_type": {
                    "type": "string",
                    "description": "Type of hills/peaks to include",
                    "enum": ["munro", "corbett", "graham", "donald", "marilyn", "any"]
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10)",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 50
                }
            }
        }),
    )]
}

/// Definitions of every tool enabled in `features`
#[must_use]
pub fn definitions(features: FeatureSet) -> Vec<ToolDefinition> {
    let mut tools = Vec::new();
    if features.weather {
        tools.extend(weather_tools());
    }
    if features.daylight {
        tools.extend(daylight_tools());
    }
    if features.driving {
        tools.extend(driving_tools());
    }
    if features.routes {
        tools.extend(route_tools());
    }
    tools
}

/// Whether `name` is a tool enabled in `features`
#[must_use]
pub fn is_enabled(features: FeatureSet, name: &str) -> bool {
    match name {
        GET_WEATHER | GET_FORECAST => features.weather,
        GET_DAYLIGHT_TIMES => features.daylight,
        GET_DRIVING_DISTANCE | PLAN_ROAD_TRIP => features.driving,
        SEARCH_ROUTES => features.routes,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tools_listed_by_default() {
        let names: Vec<String> = definitions(FeatureSet::default())
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec![
                GET_WEATHER,
                GET_FORECAST,
                GET_DAYLIGHT_TIMES,
                GET_DRIVING_DISTANCE,
                PLAN_ROAD_TRIP,
                SEARCH_ROUTES
            ]
        );
    }

    #[test]
    fn test_disabled_features_are_hidden() {
        let features = FeatureSet {
            driving: false,
            routes: false,
            ..FeatureSet::default()
        };
        let tools = definitions(features);
        assert_eq!(tools.len(), 3);
        assert!(!is_enabled(features, PLAN_ROAD_TRIP));
        assert!(is_enabled(features, GET_DAYLIGHT_TIMES));
    }

    #[test]
    fn test_definition_uses_camel_case_schema_key() {
        let value = serde_json::to_value(&weather_tools()[0]).unwrap();
        assert_eq!(value["name"], "get_weather");
        assert_eq!(value["inputSchema"]["required"][0], "location");
        assert!(value.get("input_schema").is_none());
    }
}
