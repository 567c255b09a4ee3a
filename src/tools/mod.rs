//! JSON tool protocol
//!
//! Every data provider is exposed as a named tool behind a two-method
//! envelope: `tools/list` returns the tool definitions and `tools/call`
//! runs one tool and returns its text. The same envelope is served over
//! HTTP at `POST /mcp` and used in-process by the assistant.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::http::{build_client, ensure_success, read_json};
use crate::{AdventureError, Result};

pub mod catalog;
pub mod server;

pub use catalog::{ToolDefinition, definitions};
pub use server::ToolServer;

pub const METHOD_LIST: &str = "tools/list";
pub const METHOD_CALL: &str = "tools/call";

/// Request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<CallParams>,
}

/// `tools/call` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolRequest {
    #[must_use]
    pub fn list() -> Self {
        Self {
            method: METHOD_LIST.to_string(),
            params: None,
        }
    }

    #[must_use]
    pub fn call(name: &str, arguments: Map<String, Value>) -> Self {
        Self {
            method: METHOD_CALL.to_string(),
            params: Some(CallParams {
                name: name.to_string(),
                arguments,
            }),
        }
    }
}

/// One block of tool output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Response envelope; exactly one of `tools`, `content` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Tools { tools: Vec<ToolDefinition> },
    Content { content: Vec<ContentBlock> },
    Error { error: String },
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Content {
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// Concatenated text of a content response.
    ///
    /// An `error` envelope becomes `ProviderUnavailable` carrying the
    /// envelope's message.
    pub fn into_text(self) -> Result<String> {
        match self {
            Self::Content { content } => Ok(content
                .into_iter()
                .map(|block| block.text)
                .collect::<Vec<String>>()
                .join("\n")),
            Self::Error { error } => Err(AdventureError::provider("tools", error)),
            Self::Tools { .. } => Err(AdventureError::malformed(
                "tools",
                "expected tool output, got a tool list",
            )),
        }
    }
}

/// Anything that can answer tool envelopes
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn send(&self, request: ToolRequest) -> Result<ToolResponse>;

    /// Run one tool and return its text
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        self.send(ToolRequest::call(name, arguments))
            .await?
            .into_text()
    }
}

/// Tool server reached over HTTP
pub struct RemoteTools {
    client: Client,
    url: String,
}

impl RemoteTools {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_url(url: &str, timeout_seconds: u32) -> Result<Self> {
        Ok(Self::new(build_client(timeout_seconds)?, url))
    }
}

#[async_trait]
impl ToolTransport for RemoteTools {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn send(&self, request: ToolRequest) -> Result<ToolResponse> {
        debug!("Sending {} to remote tool server", request.method);
        let response = ensure_success(
            self.client.post(&self.url).json(&request).send().await,
            "tools",
        )?;
        read_json(response, "tools").await
    }
}

/// Build a JSON argument map from key/value pairs
#[must_use]
pub fn arguments<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_request_wire_shape() {
        let request = ToolRequest::call("get_weather", arguments([("location", json!("Oban"))]));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "tools/call",
                "params": {"name": "get_weather", "arguments": {"location": "Oban"}}
            })
        );
    }

    #[test]
    fn test_list_request_has_no_params() {
        assert_eq!(
            serde_json::to_value(ToolRequest::list()).unwrap(),
            json!({"method": "tools/list"})
        );
    }

    #[test]
    fn test_request_without_arguments_parses() {
        let request: ToolRequest =
            serde_json::from_value(json!({"method": "tools/call", "params": {"name": "x"}}))
                .unwrap();
        let params = request.params.unwrap();
        assert_eq!(params.name, "x");
        assert!(params.arguments.is_empty());
    }

    #[test]
    fn test_response_wire_shapes() {
        assert_eq!(
            serde_json::to_value(ToolResponse::text("hello")).unwrap(),
            json!({"content": [{"type": "text", "text": "hello"}]})
        );
        assert_eq!(
            serde_json::to_value(ToolResponse::error("Unknown tool: x")).unwrap(),
            json!({"error": "Unknown tool: x"})
        );
    }

    #[test]
    fn test_response_parsing_picks_variant() {
        let content: ToolResponse =
            serde_json::from_value(json!({"content": [{"type": "text", "text": "a"}]})).unwrap();
        assert_eq!(content.into_text().unwrap(), "a");

        let error: ToolResponse = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert!(matches!(
            error.into_text().unwrap_err(),
            AdventureError::ProviderUnavailable { .. }
        ));
    }
}
