//! Message types for bot communication

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation / destination identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChatId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ChatId)
    }
}

/// Kind of conversation an event arrived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatKind {
    /// One-to-one chat with a user
    Private,
    /// Group, supergroup or channel
    Group,
}

/// One inbound text event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub kind: ChatKind,
    /// Message text; empty for non-text messages
    pub text: String,
}

impl InboundEvent {
    pub fn private(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id: ChatId(chat_id),
            kind: ChatKind::Private,
            text: text.into(),
        }
    }

    pub fn group(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id: ChatId(chat_id),
            kind: ChatKind::Group,
            text: text.into(),
        }
    }
}

/// Formatting directive for outbound text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
    #[serde(rename = "MarkdownV2")]
    MarkdownV2,
}

/// Link button attached under a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// Keyboard attachment describing the next valid inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyboard {
    /// Reply keyboard, one inner vec per row
    Reply(Vec<Vec<String>>),
    /// Remove any reply keyboard (free-text input expected)
    Remove,
    /// Inline URL buttons
    Links(Vec<LinkButton>),
}

impl Keyboard {
    /// Lay out labels as a reply keyboard, `per_row` buttons per row
    pub fn from_labels<I, S>(labels: I, per_row: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let rows = labels
            .chunks(per_row.max(1))
            .map(<[String]>::to_vec)
            .collect();
        Keyboard::Reply(rows)
    }

    /// Labels of a reply keyboard in row order
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Keyboard::Reply(rows) => rows.iter().flatten().map(String::as_str).collect(),
            Keyboard::Remove | Keyboard::Links(_) => Vec::new(),
        }
    }
}

/// A message to deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    /// Plain text without formatting
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            keyboard: None,
        }
    }

    /// HTML-formatted text
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Html),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_layout() {
        let keyboard = Keyboard::from_labels(["a", "b", "c"], 2);
        assert_eq!(
            keyboard,
            Keyboard::Reply(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ])
        );
        assert_eq!(keyboard.labels(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_chat_id_parse() {
        assert_eq!(" -100123 ".parse::<ChatId>().unwrap(), ChatId(-100_123));
        assert!("abc".parse::<ChatId>().is_err());
    }

    #[test]
    fn test_message_builders() {
        let msg = OutgoingMessage::html("<b>hi</b>").with_keyboard(Keyboard::Remove);
        assert_eq!(msg.parse_mode, Some(ParseMode::Html));
        assert_eq!(msg.keyboard, Some(Keyboard::Remove));
    }
}
