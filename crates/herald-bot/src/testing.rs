//! Test doubles shared across modules

use async_trait::async_trait;
use herald_llm::{CompletionRequest, CompletionResponse, LLMError, LLMProvider};
use std::sync::Mutex;

pub(crate) use crate::interface::sender::testing::RecordingSender;

/// Answers with a fixed text, or fails when `answer` is `None`
pub(crate) struct CannedProvider {
    answer: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl CannedProvider {
    pub(crate) fn new(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(str::to_string),
            prompts: Mutex::default(),
        }
    }

    /// User prompts received so far
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for CannedProvider {
    async fn complete(&self, request: CompletionRequest) -> herald_llm::Result<CompletionResponse> {
        let prompt = request.prompt().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt);
        match &self.answer {
            Some(text) => Ok(CompletionResponse::new(text.clone())),
            None => Err(LLMError::from_status(502, "bad gateway")),
        }
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}
