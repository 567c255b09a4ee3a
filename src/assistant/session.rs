//! Per-conversation memory

use std::collections::VecDeque;

use crate::config::AssistantConfig;

const RECOMMENDATION_WORDS: &[&str] = &["recommend", "suggest", "better", "alternative"];

/// One user message and the reply it got
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

/// Bounded state carried from one turn to the next
#[derive(Debug, Clone)]
pub struct ConversationState {
    recent_exchanges: VecDeque<Exchange>,
    discussed_locations: VecDeque<String>,
    pub activity: Option<String>,
    pub timeframe: Option<String>,
    pub previous_recommendation: Option<String>,
    max_exchanges: usize,
    max_locations: usize,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::with_limits(6, 8)
    }
}

impl ConversationState {
    #[must_use]
    pub fn new(config: &AssistantConfig) -> Self {
        Self::with_limits(config.max_stored_exchanges, config.max_discussed_locations)
    }

    #[must_use]
    pub fn with_limits(max_exchanges: usize, max_locations: usize) -> Self {
        Self {
            recent_exchanges: VecDeque::with_capacity(max_exchanges),
            discussed_locations: VecDeque::with_capacity(max_locations),
            activity: None,
            timeframe: None,
            previous_recommendation: None,
            max_exchanges,
            max_locations,
        }
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.recent_exchanges.iter()
    }

    /// The last `count` exchanges, oldest first
    pub fn last_exchanges(&self, count: usize) -> impl Iterator<Item = &Exchange> {
        let skip = self.recent_exchanges.len().saturating_sub(count);
        self.recent_exchanges.iter().skip(skip)
    }

    pub fn discussed_locations(&self) -> impl Iterator<Item = &str> {
        self.discussed_locations.iter().map(String::as_str)
    }

    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.recent_exchanges.push_back(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        while self.recent_exchanges.len() > self.max_exchanges {
            self.recent_exchanges.pop_front();
        }
    }

    /// Add places not yet seen; the oldest fall off past the limit
    pub fn remember_locations(&mut self, locations: &[String]) {
        for location in locations {
            if !self.discussed_locations.contains(location) {
                self.discussed_locations.push_back(location.clone());
            }
        }
        while self.discussed_locations.len() > self.max_locations {
            self.discussed_locations.pop_front();
        }
    }

    /// Keep the first two sentences of replies that give advice
    pub fn capture_recommendation(&mut self, reply: &str) {
        let lower = reply.to_lowercase();
        if RECOMMENDATION_WORDS.iter().any(|w| lower.contains(w)) {
            let summary = reply.split('.').take(2).collect::<Vec<&str>>().join(".");
            self.previous_recommendation = Some(summary.trim().to_string());
        }
    }

    /// "User is planning: ..." lines, or `None` when nothing is known yet
    #[must_use]
    pub fn context_summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(activity) = &self.activity {
            parts.push(format!("User is planning: {activity}"));
        }
        if let Some(timeframe) = &self.timeframe {
            parts.push(format!("Time: {timeframe}"));
        }
        if !self.discussed_locations.is_empty() {
            let places: Vec<&str> = self.discussed_locations().collect();
            parts.push(format!("Locations discussed: {}", places.join(", ")));
        }
        if let Some(advice) = &self.previous_recommendation {
            parts.push(format!("Previous advice: {advice}"));
        }
        (!parts.is_empty()).then(|| parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchanges_are_bounded() {
        let mut state = ConversationState::default();
        for i in 0..10 {
            state.record_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        let users: Vec<&str> = state.exchanges().map(|e| e.user.as_str()).collect();
        assert_eq!(users, vec!["q4", "q5", "q6", "q7", "q8", "q9"]);

        let last: Vec<&str> = state.last_exchanges(3).map(|e| e.user.as_str()).collect();
        assert_eq!(last, vec!["q7", "q8", "q9"]);
    }

    #[test]
    fn test_locations_deduplicated_and_bounded() {
        let mut state = ConversationState::with_limits(6, 3);
        state.remember_locations(&["Oban".into(), "Mull".into()]);
        state.remember_locations(&["Oban".into(), "Skye".into(), "Arran".into()]);
        let places: Vec<&str> = state.discussed_locations().collect();
        assert_eq!(places, vec!["Mull", "Skye", "Arran"]);
    }

    #[test]
    fn test_recommendation_capture() {
        let mut state = ConversationState::default();
        state.capture_recommendation("It looks wet. Bring a jacket.");
        assert!(state.previous_recommendation.is_none());

        state.capture_recommendation(
            "I'd suggest Glencoe instead. The forecast is drier. Also bring midge spray.",
        );
        assert_eq!(
            state.previous_recommendation.as_deref(),
            Some("I'd suggest Glencoe instead. The forecast is drier")
        );
    }

    #[test]
    fn test_context_summary() {
        let mut state = ConversationState::default();
        assert!(state.context_summary().is_none());

        state.activity = Some("camping".to_string());
        state.timeframe = Some("weekend".to_string());
        state.remember_locations(&["Skye".into(), "Oban".into()]);
        assert_eq!(
            state.context_summary().unwrap(),
            "User is planning: camping\nTime: weekend\nLocations discussed: Skye, Oban"
        );
    }
}
