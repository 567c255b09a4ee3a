//! Checks that a generated reply is usable text

use std::collections::HashMap;

use crate::{AdventureError, Result};

/// One check over a generated reply
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Err(reason)` when the text fails this rule
    fn check(&self, text: &str) -> std::result::Result<(), String>;
}

/// Rejects near-empty replies
pub struct MinLength {
    pub min_chars: usize,
}

impl ValidationRule for MinLength {
    fn name(&self) -> &'static str {
        "min_length"
    }

    fn check(&self, text: &str) -> std::result::Result<(), String> {
        let length = text.trim().chars().count();
        if length < self.min_chars {
            return Err(format!("only {length} characters"));
        }
        Ok(())
    }
}

/// Rejects replies where one word makes up too much of the text
pub struct DominantWord {
    pub min_words: usize,
    pub max_share: f64,
}

impl ValidationRule for DominantWord {
    fn name(&self) -> &'static str {
        "dominant_word"
    }

    fn check(&self, text: &str) -> std::result::Result<(), String> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| w.chars().count() > 3)
            .collect();
        if words.len() < self.min_words {
            return Ok(());
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in &words {
            *counts.entry(word.as_str()).or_default() += 1;
        }
        if let Some((word, count)) = counts.into_iter().max_by_key(|&(_, count)| count) {
            let share = count as f64 / words.len() as f64;
            if share > self.max_share {
                return Err(format!("'{word}' is {:.0}% of the words", share * 100.0));
            }
        }
        Ok(())
    }
}

/// Rejects the same token repeated back to back
pub struct RepeatedToken {
    pub max_run: usize,
}

impl ValidationRule for RepeatedToken {
    fn name(&self) -> &'static str {
        "repeated_token"
    }

    fn check(&self, text: &str) -> std::result::Result<(), String> {
        let mut previous: Option<&str> = None;
        let mut run = 0;
        for token in text.split_whitespace() {
            if previous == Some(token) {
                run += 1;
            } else {
                previous = Some(token);
                run = 1;
            }
            if run > self.max_run {
                return Err(format!("'{token}' repeated {run} times in a row"));
            }
        }
        Ok(())
    }
}

/// Rejects chat-template control tokens leaking into the text
pub struct LeakedTokens {
    pub patterns: Vec<String>,
}

impl Default for LeakedTokens {
    fn default() -> Self {
        Self {
            patterns: [
                "<|eot_id|>",
                "<|start_header_id|>",
                "<|end_header_id|>",
                "<|im_start|>",
                "<|im_end|>",
                "<|endoftext|>",
                "[INST]",
                "[/INST]",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ValidationRule for LeakedTokens {
    fn name(&self) -> &'static str {
        "leaked_tokens"
    }

    fn check(&self, text: &str) -> std::result::Result<(), String> {
        match self.patterns.iter().find(|p| text.contains(p.as_str())) {
            Some(pattern) => Err(format!("contains {pattern}")),
            None => Ok(()),
        }
    }
}

/// Ordered set of rules; the first failure wins
pub struct OutputValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self::empty()
            .with_rule(MinLength { min_chars: 20 })
            .with_rule(DominantWord {
                min_words: 10,
                max_share: 0.3,
            })
            .with_rule(RepeatedToken { max_run: 3 })
            .with_rule(LeakedTokens::default())
    }
}

impl OutputValidator {
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn validate(&self, text: &str) -> Result<()> {
        for rule in &self.rules {
            rule.check(text).map_err(|reason| {
                AdventureError::validation_failure(format!("{}: {reason}", rule.name()))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_accepts_normal_reply() {
        let reply = "Aviemore looks dry this afternoon with light winds, so a walk \
                     around Loch an Eilein would be lovely. Take a warm layer for the evening.";
        assert!(OutputValidator::default().validate(reply).is_ok());
    }

    #[rstest]
    #[case::too_short("Okay.")]
    #[case::dominant("rain rain rain everywhere and rain tomorrow with rain then rain after rain later rain")]
    #[case::stutter("The weather is is is is fine for walking in the hills today.")]
    #[case::leaked("Have a lovely walk on Ben Nevis!<|eot_id|><|start_header_id|>assistant")]
    fn test_rejects(#[case] reply: &str) {
        let err = OutputValidator::default().validate(reply).unwrap_err();
        assert!(matches!(err, AdventureError::ValidationFailure { .. }));
    }

    #[test]
    fn test_short_texts_skip_word_share() {
        let rule = DominantWord {
            min_words: 10,
            max_share: 0.3,
        };
        assert!(rule.check("Skye Skye Skye").is_ok());
    }

    #[test]
    fn test_custom_rule_set() {
        let validator = OutputValidator::empty().with_rule(MinLength { min_chars: 3 });
        assert!(validator.validate("Yes!").is_ok());
        assert!(validator.validate("no").is_err());
    }
}
