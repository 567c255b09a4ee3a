//! Whole turns through the assistant with in-process tools

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use highland_planner::Assistant;
use highland_planner::config::{AssistantConfig, FeatureSet};
use highland_planner::llm::LlmReply;

use common::{ScriptedLlm, tool_server};

const ADVICE: &str = "Aviemore is a great base today. The Loch an Eilein circuit is an easy \
                      choice, and it's worth packing a waterproof just in case.";

fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn assistant(llm: Arc<ScriptedLlm>) -> Assistant {
    let tools = Arc::new(tool_server(FeatureSet::default()));
    Assistant::new(AssistantConfig::default(), true, tools, llm)
}

#[tokio::test]
async fn test_hiking_question_end_to_end() {
    let llm = ScriptedLlm::text(&[ADVICE]);
    let bot = assistant(llm.clone());
    let mut session = bot.new_session();

    let reply = bot
        .respond_on(&mut session, "Is it good for hiking in Aviemore today?", saturday())
        .await;

    assert_eq!(reply, ADVICE);
    let prompt = llm.last_user_message(0);
    assert!(prompt.starts_with("Is it good for hiking in Aviemore today?"));
    assert!(prompt.contains("Weather for Aviemore:\nCurrent weather in Aviemore"));
    assert!(prompt.contains("- Conditions: Mainly clear"));
    assert!(prompt.contains("Walking routes:"));
    assert!(!reply.contains("Current weather in"));
    assert_eq!(*llm.offered.lock().unwrap(), vec![0]);

    assert_eq!(session.exchanges().count(), 1);
    assert_eq!(
        session.discussed_locations().collect::<Vec<_>>(),
        vec!["Aviemore"]
    );
}

#[tokio::test]
async fn test_forecast_question_gets_daily_summary() {
    let llm = ScriptedLlm::text(&[
        "Glencoe looks settled all weekend, so Saturday would suit the Pap of Glencoe nicely.",
    ]);
    let bot = assistant(llm.clone());
    let mut session = bot.new_session();

    bot.respond_on(
        &mut session,
        "What's the forecast for Glencoe this weekend?",
        saturday(),
    )
    .await;

    let prompt = llm.last_user_message(0);
    assert!(prompt.contains("-day forecast for Glencoe:"));
    assert!(prompt.contains("weather forecast for Glencoe"));
    assert!(prompt.contains("Partly cloudy"));
}

#[tokio::test]
async fn test_driving_question_uses_routing_data() {
    let llm = ScriptedLlm::text(&[
        "It's about 150 km from Glasgow to Oban, so allow three hours with a stop at Inveraray.",
    ]);
    let bot = assistant(llm.clone());
    let mut session = bot.new_session();

    bot.respond_on(
        &mut session,
        "How far is the drive from Glasgow to Oban?",
        saturday(),
    )
    .await;

    let prompt = llm.last_user_message(0);
    assert!(prompt.contains("Driving from Glasgow to Oban:"));
    assert!(prompt.contains("150.0 km"));
}

#[tokio::test]
async fn test_photography_question_gets_daylight() {
    let llm = ScriptedLlm::text(&[
        "Golden hour in Glencoe starts late in June, so get into position well before sunset.",
    ]);
    let bot = assistant(llm.clone());
    let mut session = bot.new_session();

    bot.respond_on(
        &mut session,
        "When is golden hour in Glencoe?",
        saturday(),
    )
    .await;

    let prompt = llm.last_user_message(0);
    assert!(prompt.contains("Daylight for Glencoe:"));
    assert!(prompt.contains("**Sunrise:**"));
}

#[tokio::test]
async fn test_model_failure_is_an_apology() {
    let llm = ScriptedLlm::new(vec![Err(highland_planner::AdventureError::provider(
        "llm",
        "connection refused",
    ))]);
    let bot = assistant(llm);
    let mut session = bot.new_session();

    let reply = bot
        .respond_on(&mut session, "Weather in Oban?", saturday())
        .await;

    assert!(reply.starts_with("Sorry"));
    assert_eq!(session.exchanges().count(), 1);
}

#[tokio::test]
async fn test_follow_up_keeps_context() {
    let llm = ScriptedLlm::new(vec![
        Ok(LlmReply::Text(ADVICE.to_string())),
        Ok(LlmReply::Text(
            "For tomorrow I'd still suggest staying low around Aviemore \
             and saving the tops for later."
                .to_string(),
        )),
    ]);
    let bot = assistant(llm.clone());
    let mut session = bot.new_session();

    bot.respond_on(&mut session, "Is it good for hiking in Aviemore today?", saturday())
        .await;
    bot.respond_on(&mut session, "What about tomorrow?", saturday())
        .await;

    let seen = llm.seen.lock().unwrap();
    let second = &seen[1];
    assert!(
        second
            .iter()
            .any(|m| m.content.contains("Locations discussed: Aviemore"))
    );
    assert!(second.iter().any(|m| m.content == ADVICE));
}
