//! Dialogue orchestration
//!
//! One turn: extract intent, fetch whatever data the enabled features and the
//! intent call for (strictly one call after another), hand the merged context
//! to the model, check its reply, then update the session.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{AppConfig, AssistantConfig};
use crate::daylight::uk_today;
use crate::intent::{self, Intent};
use crate::llm::{ChatMessage, LlmClient, LlmReply, OpenAiCompatible};
use crate::tools::catalog::{
    GET_DAYLIGHT_TIMES, GET_DRIVING_DISTANCE, GET_FORECAST, GET_WEATHER, PLAN_ROAD_TRIP,
    SEARCH_ROUTES, weather_tools,
};
use crate::tools::{RemoteTools, ToolServer, ToolTransport, arguments};
use crate::{AdventureError, Result};

pub mod prompt;
pub mod session;
pub mod validation;

pub use session::{ConversationState, Exchange};
pub use validation::{OutputValidator, ValidationRule};

use prompt::{
    APOLOGY, INTERPRETATION_PROMPT, LOCATION_TIP, SYSTEM_PROMPT, build_messages,
    truncate_context, user_message_with_context,
};

/// Fetched data: a label and the (truncated) tool text
type Context = Vec<(String, String)>;

/// The conversational front end over the tools and the model
pub struct Assistant {
    config: AssistantConfig,
    offer_tools: bool,
    tools: Arc<dyn ToolTransport>,
    llm: Arc<dyn LlmClient>,
    validator: OutputValidator,
}

impl Assistant {
    pub fn new(
        config: AssistantConfig,
        offer_tools: bool,
        tools: Arc<dyn ToolTransport>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            offer_tools,
            tools,
            llm,
            validator: OutputValidator::default(),
        }
    }

    /// Tools run in-process unless `providers.tool_server_url` points elsewhere
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let tools: Arc<dyn ToolTransport> = match &config.providers.tool_server_url {
            Some(url) => {
                info!("Using remote tool server at {}", url);
                Arc::new(RemoteTools::from_url(url, config.providers.timeout_seconds)?)
            }
            None => Arc::new(ToolServer::from_config(config)?),
        };
        let llm = Arc::new(OpenAiCompatible::from_config(&config.llm)?);
        Ok(Self::new(
            config.assistant.clone(),
            config.llm.offer_tools,
            tools,
            llm,
        ))
    }

    #[must_use]
    pub fn with_validator(mut self, validator: OutputValidator) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn new_session(&self) -> ConversationState {
        ConversationState::new(&self.config)
    }

    /// Answer one message; failures become an apology, never an error
    pub async fn respond(&self, state: &mut ConversationState, message: &str) -> String {
        self.respond_on(state, message, uk_today()).await
    }

    /// As [`respond`](Self::respond) with an explicit "today"
    #[instrument(skip(self, state, message), fields(chars = message.len()))]
    pub async fn respond_on(
        &self,
        state: &mut ConversationState,
        message: &str,
        today: NaiveDate,
    ) -> String {
        let intent = intent::extract_on(message, today);
        let reply = match self.run_turn(state, message, &intent).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Turn failed: {}", e);
                APOLOGY.to_string()
            }
        };
        update_session(state, message, &intent, &reply);
        reply
    }

    async fn run_turn(
        &self,
        state: &ConversationState,
        message: &str,
        intent: &Intent,
    ) -> Result<String> {
        let mut context = self.gather(intent).await;
        let weather_fetched = context
            .iter()
            .any(|(label, _)| label.starts_with("Weather") || label.contains("forecast"));

        let messages = build_messages(
            SYSTEM_PROMPT,
            state,
            self.config.history_exchanges,
            user_message_with_context(message, &context),
        );
        let tools = if self.offer_tools && self.config.features.weather && !weather_fetched {
            weather_tools()
        } else {
            Vec::new()
        };

        let text = match self.llm.complete(&messages, &tools).await? {
            LlmReply::Text(text) => text,
            LlmReply::ToolCalls(calls) => {
                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    let location = call
                        .arguments
                        .get("location")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown")
                        .to_string();
                    let text = match self.tools.call_tool(&call.name, call.arguments).await {
                        Ok(text) => text,
                        Err(e) => format!("❌ {}", e.user_message()),
                    };
                    let text = truncate_context(&text, self.config.context_char_budget);
                    results.push(format!("{location}: {text}"));
                    context.push((format!("Weather for {location}"), text));
                }
                self.interpret(state, message, &results).await?
            }
        };

        let mut reply = match self.validator.validate(&text) {
            Ok(()) => text,
            Err(e) => {
                warn!("Discarding model output: {}", e);
                fallback_summary(&context)
            }
        };

        if intent.wants_weather && intent.locations.is_empty() && !weather_fetched {
            reply.push_str(LOCATION_TIP);
        }
        Ok(reply)
    }

    /// Second, tool-free completion over data the model asked for
    async fn interpret(
        &self,
        state: &ConversationState,
        message: &str,
        results: &[String],
    ) -> Result<String> {
        let mut messages = build_messages(
            &format!("{SYSTEM_PROMPT}\n\n{INTERPRETATION_PROMPT}"),
            state,
            self.config.history_exchanges,
            message.to_string(),
        );
        messages.push(ChatMessage::user(format!(
            "Here's the data I found:\n\n{}\n\nPlease interpret this data conversationally and give me \
             practical advice, keeping in mind our previous conversation.",
            results.join("\n")
        )));
        match self.llm.complete(&messages, &[]).await? {
            LlmReply::Text(text) => Ok(text),
            LlmReply::ToolCalls(_) => Err(AdventureError::validation_failure(
                "model asked for tools again",
            )),
        }
    }

    async fn gather(&self, intent: &Intent) -> Context {
        let features = self.config.features;
        let mut context = Context::new();

        if features.weather && intent.wants_weather {
            for location in intent.locations.iter().take(self.config.max_weather_locations) {
                if intent.wants_forecast {
                    let args = arguments([
                        ("location", json!(location)),
                        ("days", json!(intent.forecast_days)),
                    ]);
                    let label = format!("{}-day forecast for {location}", intent.forecast_days);
                    self.fetch(&mut context, label, GET_FORECAST, args).await;
                } else {
                    let args = arguments([("location", json!(location))]);
                    let label = format!("Weather for {location}");
                    self.fetch(&mut context, label, GET_WEATHER, args).await;
                }
            }
        }

        if features.daylight && intent.wants_daylight {
            for location in intent.locations.iter().take(self.config.max_weather_locations) {
                let mut args = arguments([("location", json!(location))]);
                if let Some(date) = intent.date {
                    args.insert("date".to_string(), json!(date.format("%Y-%m-%d").to_string()));
                }
                let label = format!("Daylight for {location}");
                self.fetch(&mut context, label, GET_DAYLIGHT_TIMES, args).await;
            }
        }

        if features.driving && intent.wants_driving {
            match intent.locations.as_slice() {
                [from, to] => {
                    let args = arguments([
                        ("from_location", json!(from)),
                        ("to_location", json!(to)),
                    ]);
                    let label = format!("Driving from {from} to {to}");
                    self.fetch(&mut context, label, GET_DRIVING_DISTANCE, args).await;
                }
                locations if locations.len() >= 3 => {
                    let stops: Vec<&String> =
                        locations.iter().take(self.config.max_trip_locations).collect();
                    let args = arguments([("locations", json!(stops))]);
                    self.fetch(&mut context, "Road trip".to_string(), PLAN_ROAD_TRIP, args)
                        .await;
                }
                _ => debug!("Driving requested without two places"),
            }
        }

        if features.routes && intent.wants_routes {
            let mut args = Map::new();
            if let Some(location) = intent.locations.first() {
                args.insert("search_term".to_string(), json!(location));
            }
            if let Some(difficulty) = intent.difficulty {
                args.insert("difficulty".to_string(), json!(difficulty));
            }
            if args.is_empty() {
                debug!("Route search requested without a place or difficulty");
            } else {
                self.fetch(&mut context, "Walking routes".to_string(), SEARCH_ROUTES, args)
                    .await;
            }
        }

        context
    }

    async fn fetch(
        &self,
        context: &mut Context,
        label: String,
        tool: &str,
        args: Map<String, Value>,
    ) {
        match self.tools.call_tool(tool, args).await {
            Ok(text) => {
                debug!("{} returned {} characters", tool, text.len());
                context.push((label, truncate_context(&text, self.config.context_char_budget)));
            }
            Err(e) => warn!("Skipping {} ({}): {}", label, tool, e),
        }
    }
}

/// Reply assembled from the raw data when the model output is unusable
fn fallback_summary(context: &[(String, String)]) -> String {
    if context.is_empty() {
        return APOLOGY.to_string();
    }
    let blocks: Vec<String> = context
        .iter()
        .map(|(label, text)| format!("**{label}**\n{text}"))
        .collect();
    format!("Here's what I found:\n\n{}", blocks.join("\n\n"))
}

fn update_session(state: &mut ConversationState, message: &str, intent: &Intent, reply: &str) {
    state.record_exchange(message, reply);
    state.remember_locations(&intent.locations);
    if let Some(activity) = &intent.activity {
        state.activity = Some(activity.clone());
    }
    if let Some(timeframe) = &intent.timeframe {
        state.timeframe = Some(timeframe.clone());
    }
    state.capture_recommendation(reply);
}
