//! Shared HTTP client construction and response checks

use std::time::Duration;

use reqwest::{Client, Response};

use crate::{AdventureError, Result};

const USER_AGENT: &str = concat!("HighlandPlanner/", env!("CARGO_PKG_VERSION"));

/// Client with a fixed per-request timeout
pub fn build_client(timeout_seconds: u32) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AdventureError::config(format!("Failed to create HTTP client: {e}")))
}

/// Map transport failures and non-2xx statuses to `ProviderUnavailable`
pub fn ensure_success(
    result: std::result::Result<Response, reqwest::Error>,
    provider: &str,
) -> Result<Response> {
    let response = result.map_err(|e| AdventureError::provider(provider, e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(AdventureError::provider(
            provider,
            format!("HTTP status {status}"),
        ));
    }
    Ok(response)
}

/// Decode a JSON body, mapping failures to `MalformedUpstreamData`
pub async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
    provider: &str,
) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| AdventureError::malformed(provider, e.to_string()))
}
