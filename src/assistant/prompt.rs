//! Prompt text and message assembly

use super::session::ConversationState;
use crate::llm::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a helpful Scottish adventure planning assistant. You help people \
plan outdoor activities in Scotland: hiking, camping, photography, road trips and more.

IMPORTANT: You have conversation memory. Use the conversation context provided to maintain \
continuity. When users ask follow-up questions, refer back to previously discussed locations, \
activities, and preferences.

When you receive weather, daylight, driving or route data, interpret it conversationally and give \
practical advice. Don't just repeat the raw data - analyse it and give helpful recommendations in a \
natural, friendly way.

Your personality:
- Friendly and enthusiastic about Scottish adventures
- Knowledgeable about outdoor activities
- Practical and safety-conscious
- Use Scottish terms occasionally but don't overdo it

Always give specific, actionable advice based on the data and conversation context. If you have no \
data for a place, ask the user to name a specific Scottish location.";

pub const INTERPRETATION_PROMPT: &str = "Now interpret this data conversationally, keeping in mind the \
conversation context. Don't just repeat the raw data - analyse it and give practical, friendly advice \
that builds on our previous discussion.";

pub const LOCATION_TIP: &str = "\n\n💡 Tip: Mention a specific Scottish location (like Edinburgh, \
Fort William, Aviemore or the Isle of Skye) and I can get you real-time weather data!";

pub const APOLOGY: &str = "Sorry, I'm having trouble putting an answer together right now. Could you \
try rephrasing your question, or ask about a specific Scottish location?";

/// Keep at most `budget` characters of a fetched blob
#[must_use]
pub fn truncate_context(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// The current message with fetched data appended
#[must_use]
pub fn user_message_with_context(message: &str, context: &[(String, String)]) -> String {
    if context.is_empty() {
        return message.to_string();
    }
    let blocks: Vec<String> = context
        .iter()
        .map(|(label, text)| format!("{label}:\n{text}"))
        .collect();
    format!("{message}\n\n[Data context:\n\n{}]", blocks.join("\n\n"))
}

/// System prompt, context summary, recent history, then `user_content`
#[must_use]
pub fn build_messages(
    system_prompt: &str,
    state: &ConversationState,
    history_exchanges: usize,
    user_content: String,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_prompt)];
    if let Some(summary) = state.context_summary() {
        messages.push(ChatMessage::system(format!(
            "CONVERSATION CONTEXT:\n{summary}\n\n"
        )));
    }
    for exchange in state.last_exchanges(history_exchanges) {
        messages.push(ChatMessage::user(exchange.user.clone()));
        if !exchange.assistant.is_empty() {
            messages.push(ChatMessage::assistant(exchange.assistant.clone()));
        }
    }
    messages.push(ChatMessage::user(user_content));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_truncate_context_counts_characters() {
        assert_eq!(truncate_context("abcdef", 10), "abcdef");
        assert_eq!(truncate_context("abcdef", 3), "abc...");
        assert_eq!(truncate_context("🌡️ warm", 1), "🌡...");
    }

    #[test]
    fn test_user_message_with_context() {
        assert_eq!(user_message_with_context("hi", &[]), "hi");
        let text = user_message_with_context(
            "Weather in Oban?",
            &[("Weather for Oban".to_string(), "Sunny".to_string())],
        );
        assert_eq!(
            text,
            "Weather in Oban?\n\n[Data context:\n\nWeather for Oban:\nSunny]"
        );
    }

    #[test]
    fn test_messages_include_summary_and_history() {
        let mut state = ConversationState::default();
        state.activity = Some("camping".to_string());
        for i in 0..5 {
            state.record_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        let messages = build_messages(SYSTEM_PROMPT, &state, 3, "now".to_string());

        assert_eq!(messages[0].role, Role::System);
        assert!(
            messages[1]
                .content
                .starts_with("CONVERSATION CONTEXT:\nUser is planning: camping")
        );
        assert_eq!(messages[2].content, "q2");
        assert_eq!(messages[3].content, "a2");
        assert_eq!(messages.len(), 2 + 6 + 1);
        assert_eq!(messages.last().unwrap().content, "now");
    }
}
