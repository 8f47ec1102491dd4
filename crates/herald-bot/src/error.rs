//! Error types for the herald bot

use thiserror::Error;

/// Bot-level errors
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Telegram Bot API rejected a call
    #[error("Telegram API error ({method}): {description}")]
    Telegram {
        method: String,
        description: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Data file could not be loaded
    #[error("Failed to load {path}: {reason}")]
    DataLoad { path: String, reason: String },

    /// Session storage error
    #[error("Session error: {0}")]
    SessionError(String),

    /// Dialog state error
    #[error(transparent)]
    Dialog(#[from] DialogError),
}

/// Errors raised by the dialog state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogError {
    /// The state is unknown or has no menu registered
    #[error("Invalid dialog state: {0}")]
    InvalidState(String),

    /// A transition points at a state with no menu
    #[error("Menu '{from}' transitions to unregistered state '{to}'")]
    DanglingTransition { from: String, to: String },

    /// Two options of one menu share a label
    #[error("Menu '{menu}' declares label '{label}' more than once")]
    DuplicateLabel { menu: String, label: String },
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

impl From<herald_utils::ConfigError> for BotError {
    fn from(err: herald_utils::ConfigError) -> Self {
        BotError::ConfigError(err.to_string())
    }
}

impl From<herald_llm::LLMError> for BotError {
    fn from(err: herald_llm::LLMError) -> Self {
        BotError::ConfigError(err.to_string())
    }
}
