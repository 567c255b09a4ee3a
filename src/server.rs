//! HTTP surface for the tool protocol

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::tools::server::SERVICE_NAME;
use crate::tools::{ToolRequest, ToolResponse, ToolServer};

async fn mcp(
    State(tools): State<Arc<ToolServer>>,
    Json(request): Json<ToolRequest>,
) -> Json<ToolResponse> {
    Json(tools.handle(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": SERVICE_NAME}))
}

/// `POST /mcp` and `GET /health`
pub fn router(tools: Arc<ToolServer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/mcp", post(mcp))
        .route("/health", get(health))
        .with_state(tools)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Resolves once `signal` fires; never resolves if the listener could not be installed
async fn shutdown_signal(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("Shutting down tool server"),
        Err(e) => {
            warn!("Failed to listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Serve until Ctrl-C
pub async fn run(config: &ServerConfig, tools: ToolServer) -> Result<()> {
    let app = router(Arc::new(tools));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Tool server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .context("Tool server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let done = tokio::time::timeout(Duration::from_secs(1), shutdown_signal(async { Ok(()) }));
        assert!(done.await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_keeps_serving() {
        let signal = async { Err(std::io::Error::other("no signal handler")) };
        let done = tokio::time::timeout(Duration::from_millis(50), shutdown_signal(signal));
        assert!(done.await.is_err(), "server must not stop when Ctrl-C cannot be watched");
    }
}
