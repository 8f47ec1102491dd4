//! Completion layer for herald
//!
//! [`LLMProvider`] is the seam to a chat-completion backend and
//! [`providers::OpenAIProvider`] talks to any OpenAI-compatible endpoint.
//! The bot never calls a provider directly: it goes through
//! [`FallbackCompleter`], which always produces a reply.

pub mod completion;
pub mod error;
pub mod fallback;
pub mod messages;
pub mod provider;
pub mod providers;

pub use completion::{CompletionRequest, CompletionResponse, FinishReason, TokenUsage};
pub use error::{LLMError, Result};
pub use fallback::{FallbackCompleter, FallbackSettings};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

#[cfg(test)]
pub use provider::MockLLMProvider;
