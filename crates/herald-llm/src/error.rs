//! Errors from completion providers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Missing or invalid provider settings
    #[error("Provider configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API key was rejected
    #[error("Completion API rejected the credentials")]
    Unauthorized,

    #[error("Completion API rate limit hit: {0}")]
    RateLimited(String),

    /// Any other non-2xx answer
    #[error("Completion API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx answer that does not carry a completion
    #[error("Malformed completion response: {0}")]
    Malformed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LLMError {
    /// Classify a non-2xx response
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => LLMError::Unauthorized,
            429 => LLMError::RateLimited(body),
            _ => LLMError::Status { status, body },
        }
    }
}
