//! Degrade-to-default completion wrapper
//!
//! [`FallbackCompleter`] turns a prompt into text and never fails: provider
//! errors, non-2xx responses, timeouts and empty answers all collapse into the
//! configured fallback reply. Callers cannot tell a fallback from a real
//! answer apart from the log line emitted here.

use crate::{CompletionRequest, LLMProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default apology sent when the completion API cannot answer
pub const DEFAULT_FALLBACK_REPLY: &str =
    "Sorry, I can't answer that right now. Please try again a bit later.";

/// Settings for [`FallbackCompleter`]
#[derive(Debug, Clone)]
pub struct FallbackSettings {
    /// Model identifier passed to the provider
    pub model: String,

    /// Upper bound on generated tokens
    pub max_tokens: usize,

    /// Bound on the whole provider call
    pub timeout: Duration,

    /// Optional system prompt prepended to every request
    pub system_prompt: Option<String>,

    /// Text returned whenever the call fails
    pub fallback_reply: String,
}

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            timeout: Duration::from_secs(30),
            system_prompt: None,
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }
}

/// Prompt-in, text-out completion that always yields a string
#[derive(Clone)]
pub struct FallbackCompleter {
    provider: Arc<dyn LLMProvider>,
    settings: FallbackSettings,
}

impl FallbackCompleter {
    /// Wrap a provider
    pub fn new(provider: Arc<dyn LLMProvider>, settings: FallbackSettings) -> Self {
        Self { provider, settings }
    }

    /// Current settings
    pub fn settings(&self) -> &FallbackSettings {
        &self.settings
    }

    /// The configured fallback reply
    pub fn fallback_reply(&self) -> &str {
        &self.settings.fallback_reply
    }

    /// Generate text for `prompt`, or the fallback reply on any failure
    pub async fn complete_text(&self, prompt: &str) -> String {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            warn!("Refusing to send an empty prompt to the completion API");
            return self.settings.fallback_reply.clone();
        }

        let mut request =
            CompletionRequest::new(&self.settings.model, self.settings.max_tokens).user(prompt);
        if let Some(system) = &self.settings.system_prompt {
            request = request.system(system);
        }

        match tokio::time::timeout(self.settings.timeout, self.provider.complete(request)).await {
            Ok(Ok(response)) => {
                let text = response.text.trim();
                if text.is_empty() {
                    warn!("Completion API returned an empty answer, using fallback reply");
                    return self.settings.fallback_reply.clone();
                }
                debug!(
                    completion_tokens = response.usage.completion_tokens,
                    "Completion succeeded"
                );
                text.to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Completion API call failed, using fallback reply");
                self.settings.fallback_reply.clone()
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.settings.timeout.as_secs(),
                    "Completion API call timed out, using fallback reply"
                );
                self.settings.fallback_reply.clone()
            }
        }
    }
}

impl std::fmt::Debug for FallbackCompleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCompleter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
