//! Fact-of-the-day broadcast source
//!
//! Picks one `fact_*` prompt template per day, rotating by day of year, and
//! asks the completion API for the body. Completion failures surface as the
//! completer's fallback reply.

use super::BroadcastSource;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use herald_llm::FallbackCompleter;
use herald_prompt::PromptCatalog;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name prefix of templates eligible for the rotation
pub const FACT_TEMPLATE_PREFIX: &str = "fact_";

pub struct FactOfTheDay {
    prompts: Arc<PromptCatalog>,
    completer: FallbackCompleter,
}

impl FactOfTheDay {
    pub fn new(prompts: Arc<PromptCatalog>, completer: FallbackCompleter) -> Self {
        Self { prompts, completer }
    }

    /// Prompt for `date`
    pub fn prompt_for(&self, date: NaiveDate) -> String {
        let templates: Vec<_> = self.prompts.with_prefix(FACT_TEMPLATE_PREFIX).collect();
        if templates.is_empty() {
            return builtin_prompt(date);
        }

        let template = templates[date.ordinal0() as usize % templates.len()];
        let vars = json!({
            "date": date.format("%Y-%m-%d").to_string(),
            "weekday": date.format("%A").to_string(),
        });
        debug!(template = %template.name, %date, "Selected fact template");

        template.render(&vars).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to render fact template, using the built-in prompt");
            builtin_prompt(date)
        })
    }

    /// Generate the fact for `date`
    pub async fn fact_for(&self, date: NaiveDate) -> String {
        self.completer.complete_text(&self.prompt_for(date)).await
    }
}

fn builtin_prompt(date: NaiveDate) -> String {
    format!(
        "Share one short, surprising fact for {}. Keep it to two sentences.",
        date.format("%A, %B %-d")
    )
}

#[async_trait]
impl BroadcastSource for FactOfTheDay {
    async fn body(&self) -> Option<String> {
        Some(self.fact_for(Utc::now().date_naive()).await)
    }

    fn name(&self) -> &'static str {
        "fact-of-the-day"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedProvider;
    use herald_llm::FallbackSettings;
    use herald_prompt::PromptTemplate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn facts(templates: Vec<PromptTemplate>, provider: Arc<CannedProvider>) -> FactOfTheDay {
        FactOfTheDay::new(
            Arc::new(PromptCatalog::from_templates(templates)),
            FallbackCompleter::new(provider, FallbackSettings::default()),
        )
    }

    #[test]
    fn test_rotation_by_day_of_year() {
        let facts = facts(
            vec![
                PromptTemplate::new("fact_lore", "Lore fact for {{ date }}"),
                PromptTemplate::new("assistant_question", "ignored"),
                PromptTemplate::new("fact_tips", "Tip for {{ weekday }}"),
            ],
            Arc::new(CannedProvider::new(Some("ok"))),
        );

        // Jan 1 is day 0, Jan 2 is day 1
        assert_eq!(facts.prompt_for(date(2026, 1, 1)), "Lore fact for 2026-01-01");
        assert_eq!(facts.prompt_for(date(2026, 1, 2)), "Tip for Friday");
        assert_eq!(facts.prompt_for(date(2026, 1, 3)), "Lore fact for 2026-01-03");
    }

    #[test]
    fn test_builtin_prompt_without_templates() {
        let facts = facts(Vec::new(), Arc::new(CannedProvider::new(Some("ok"))));
        let prompt = facts.prompt_for(date(2026, 10, 19));
        assert!(prompt.contains("Monday, October 19"));
    }

    #[tokio::test]
    async fn test_fact_comes_from_completion() {
        let provider = Arc::new(CannedProvider::new(Some("Owls cannot move their eyes.")));
        let facts = facts(
            vec![PromptTemplate::new("fact_nature", "Nature fact for {{ date }}")],
            provider.clone(),
        );

        assert_eq!(facts.fact_for(date(2026, 3, 4)).await, "Owls cannot move their eyes.");
        assert_eq!(provider.prompts(), vec!["Nature fact for 2026-03-04".to_string()]);
    }

    #[tokio::test]
    async fn test_completion_failure_uses_fallback() {
        let facts = facts(Vec::new(), Arc::new(CannedProvider::new(None)));
        assert_eq!(
            facts.body().await.as_deref(),
            Some(herald_llm::fallback::DEFAULT_FALLBACK_REPLY)
        );
    }
}
