//! OpenAI-compatible chat completion client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

use crate::config::LlmConfig;
use crate::http::{build_client, ensure_success, read_json};
use crate::tools::ToolDefinition;
use crate::{AdventureError, Result};

const PROVIDER: &str = "llm";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// What the model answered with
#[derive(Debug, Clone, PartialEq)]
pub enum LlmReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
}

/// Chat completion backend
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete `messages`, offering `tools` as callable functions when non-empty
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition])
    -> Result<LlmReply>;
}

/// `POST {base_url}/chat/completions` with bearer auth
pub struct OpenAiCompatible {
    client: Client,
    config: LlmConfig,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON object encoded as a string
    #[serde(default)]
    arguments: String,
}

impl OpenAiCompatible {
    pub fn new(client: Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self::new(build_client(config.timeout_seconds)?, config.clone()))
    }

    fn request_body(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });
        if let Some(top_p) = self.config.top_p {
            body["top_p"] = json!(top_p);
        }
        if let Some(penalty) = self.config.frequency_penalty {
            body["frequency_penalty"] = json!(penalty);
        }
        if let Some(penalty) = self.config.presence_penalty {
            body["presence_penalty"] = json!(penalty);
        }
        if !tools.is_empty() {
            let functions: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.input_schema,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(functions);
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

fn parse_reply(response: CompletionResponse) -> Result<LlmReply> {
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdventureError::malformed(PROVIDER, "response had no choices"))?
        .message;

    match message.tool_calls {
        Some(calls) if !calls.is_empty() => {
            let calls = calls
                .into_iter()
                .map(|call| {
                    let arguments = if call.function.arguments.trim().is_empty() {
                        Map::new()
                    } else {
                        serde_json::from_str(&call.function.arguments).map_err(|e| {
                            AdventureError::malformed(
                                PROVIDER,
                                format!("bad arguments for {}: {e}", call.function.name),
                            )
                        })?
                    };
                    Ok(ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments,
                    })
                })
                .collect::<Result<Vec<ToolCall>>>()?;
            Ok(LlmReply::ToolCalls(calls))
        }
        _ => Ok(LlmReply::Text(message.content.unwrap_or_default())),
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatible {
    #[instrument(
        skip_all,
        fields(model = %self.config.model, messages = messages.len(), tools = tools.len())
    )]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<LlmReply> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AdventureError::config("LLM API key not set (NEBIUS_API_KEY)"))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!("Chat completion request URL: {}", url);

        let response = ensure_success(
            self.client
                .post(&url)
                .bearer_auth(api_key)
                .json(&self.request_body(messages, tools))
                .send()
                .await,
            PROVIDER,
        )?;
        let body: CompletionResponse = read_json(response, PROVIDER).await?;
        let reply = parse_reply(body)?;
        match &reply {
            LlmReply::Text(text) => info!("Model replied with {} characters", text.len()),
            LlmReply::ToolCalls(calls) => info!("Model requested {} tool calls", calls.len()),
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::weather_tools;

    fn client() -> OpenAiCompatible {
        OpenAiCompatible::new(Client::new(), LlmConfig::default())
    }

    #[test]
    fn test_request_body_without_tools() {
        let body = client().request_body(&[ChatMessage::user("hello")], &[]);
        assert_eq!(body["model"], "meta-llama/Meta-Llama-3.1-8B-Instruct");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["max_tokens"], 600);
        assert!(body.get("tools").is_none());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_request_body_offers_functions() {
        let body = client().request_body(&[ChatMessage::system("x")], &weather_tools());
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_weather");
        assert_eq!(body["tools"][1]["function"]["parameters"]["required"][0], "location");
    }

    #[test]
    fn test_parse_text_reply() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Pack a waterproof."},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(
            parse_reply(response).unwrap(),
            LlmReply::Text("Pack a waterproof.".to_string())
        );
    }

    #[test]
    fn test_parse_tool_call_reply() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"get_forecast","arguments":"{\"location\":\"Oban\",\"days\":5}"}}]}}]}"#,
        )
        .unwrap();
        let LlmReply::ToolCalls(calls) = parse_reply(response).unwrap() else {
            panic!("expected tool calls");
        };
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "get_forecast");
        assert_eq!(calls[0].arguments["days"], 5);
    }

    #[test]
    fn test_parse_rejects_bad_arguments() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"tool_calls":[{"id":"c","function":{"name":"get_weather","arguments":"{not json"}}]}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            parse_reply(response).unwrap_err(),
            AdventureError::MalformedUpstreamData { .. }
        ));
    }

    #[test]
    fn test_parse_empty_choices() {
        let response: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parse_reply(response).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let err = client()
            .complete(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdventureError::Config { .. }));
    }
}
