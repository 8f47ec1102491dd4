//! Keyword-triggered replies for group chats

use crate::error::{BotError, Result};
use regex::Regex;

/// One keyword and its canned reply
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keyword: String,
    pub reply: String,
    pattern: Regex,
}

impl KeywordRule {
    /// Whole-word, case-insensitive rule
    pub fn new(keyword: impl Into<String>, reply: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword.trim())))
            .map_err(|e| BotError::ConfigError(format!("Invalid keyword '{keyword}': {e}")))?;
        Ok(Self {
            keyword,
            reply: reply.into(),
            pattern,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered keyword rules; the first match wins
#[derive(Debug, Clone, Default)]
pub struct KeywordResponder {
    rules: Vec<KeywordRule>,
}

impl KeywordResponder {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Rules the bot ships with
    pub fn with_defaults() -> Result<Self> {
        let rules = [
            ("hello", "Hi there! 👋 Message me privately and send /start for the full menu."),
            ("help", "Need help? Send me /help in a private chat."),
            ("heroes", "Browse every hero with /start → characters in a private chat."),
            ("event", "Check the pinned message for the current event schedule."),
        ]
        .into_iter()
        .map(|(keyword, reply)| KeywordRule::new(keyword, reply))
        .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Reply for the first matching rule
    pub fn respond(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.reply.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
