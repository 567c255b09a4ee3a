//! The tool protocol over HTTP

mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use highland_planner::config::FeatureSet;
use highland_planner::server::router;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::tool_server;

fn app() -> axum::Router {
    router(Arc::new(tool_server(FeatureSet::default())))
}

async fn post_mcp(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "Highland Planner Tools"})
    );
}

#[tokio::test]
async fn test_list_tools() {
    let (status, body) = post_mcp(app(), json!({"method": "tools/list"})).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "get_weather",
            "get_forecast",
            "get_daylight_times",
            "get_driving_distance",
            "plan_road_trip",
            "search_routes"
        ]
    );
    assert!(body["tools"][0]["inputSchema"]["properties"]["location"].is_object());
}

#[tokio::test]
async fn test_list_respects_features() {
    let features = FeatureSet {
        weather: true,
        daylight: false,
        driving: false,
        routes: false,
    };
    let app = router(Arc::new(tool_server(features)));
    let (_, body) = post_mcp(app, json!({"method": "tools/list"})).await;
    assert_eq!(body["tools"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_call_daylight() {
    let (status, body) = post_mcp(
        app(),
        json!({
            "method": "tools/call",
            "params": {
                "name": "get_daylight_times",
                "arguments": {"location": "Glencoe", "date": "2024-06-21"}
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"][0]["type"], "text");
    let text = body["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Daylight Times for Glencoe"));
    assert!(text.contains("2024-06-21"));
}

#[tokio::test]
async fn test_call_driving_distance() {
    let (_, body) = post_mcp(
        app(),
        json!({
            "method": "tools/call",
            "params": {
                "name": "get_driving_distance",
                "arguments": {"from_location": "Glasgow", "to_location": "Oban"}
            }
        }),
    )
    .await;
    let text = body["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("150.0 km"));
}

#[tokio::test]
async fn test_error_envelopes() {
    let (status, body) = post_mcp(app(), json!({"method": "prompts/list"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Unsupported method: prompts/list"}));

    let (_, body) = post_mcp(
        app(),
        json!({"method": "tools/call", "params": {"name": "get_tides", "arguments": {}}}),
    )
    .await;
    assert_eq!(body, json!({"error": "Unknown tool: get_tides"}));

    let (_, body) = post_mcp(
        app(),
        json!({
            "method": "tools/call",
            "params": {"name": "get_weather", "arguments": {"location": "Atlantis"}}
        }),
    )
    .await;
    assert_eq!(body, json!({"error": "Could not find location: Atlantis"}));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}
