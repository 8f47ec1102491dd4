//! Runtime configuration
//!
//! Everything is read from `HERALD_*` environment variables with defaults;
//! Telegram and OpenAI credentials are read by their own clients.

use crate::broadcast::{Destination, Schedule};
use crate::dialog::DEFAULT_HISTORY_LIMIT;
use crate::error::{BotError, Result};
use crate::session::DEFAULT_SESSION_TTL_SECS;
use herald_llm::FallbackSettings;
use herald_llm::fallback::DEFAULT_FALLBACK_REPLY;
use herald_utils::{env_list, env_or, env_string_or};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BROADCAST_MESSAGE: &str = "This is an automatic message from Herald.";

/// One timed emitter: where to send and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    pub destinations: Vec<Destination>,
    pub schedule: Schedule,
}

/// Configuration for the herald bot
#[derive(Debug, Clone)]
pub struct HeraldConfig {
    /// Hero catalog JSON file
    pub heroes_path: PathBuf,

    /// Prompt template JSON file
    pub prompts_path: PathBuf,

    /// Chat completion model
    pub openai_model: String,

    /// Idle time before a conversation starts over
    pub session_ttl_secs: i64,

    /// Search queries kept per conversation
    pub search_history_limit: usize,

    /// Bound on one completion call
    pub completion_timeout: Duration,

    pub max_completion_tokens: usize,

    /// Sent when the completion API cannot answer
    pub fallback_reply: String,

    /// Static broadcast body
    pub broadcast_message: String,

    pub broadcast: EmitterConfig,

    pub facts: EmitterConfig,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            heroes_path: PathBuf::from("data/heroes.json"),
            prompts_path: PathBuf::from("data/prompts.json"),
            openai_model: "gpt-4o-mini".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            search_history_limit: DEFAULT_HISTORY_LIMIT,
            completion_timeout: Duration::from_secs(30),
            max_completion_tokens: 300,
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            broadcast_message: DEFAULT_BROADCAST_MESSAGE.to_string(),
            broadcast: EmitterConfig {
                destinations: Vec::new(),
                schedule: Schedule::broadcast_default(),
            },
            facts: EmitterConfig {
                destinations: Vec::new(),
                schedule: Schedule::daily_default(),
            },
        }
    }
}

impl HeraldConfig {
    /// Create a new configuration builder
    pub fn builder() -> HeraldConfigBuilder {
        HeraldConfigBuilder::default()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        HeraldConfigBuilder::default().from_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.session_ttl_secs <= 0 {
            return Err(BotError::ConfigError(
                "HERALD_SESSION_TTL_SECS must be greater than 0".to_string(),
            ));
        }

        if self.search_history_limit == 0 {
            return Err(BotError::ConfigError(
                "HERALD_SEARCH_HISTORY_LIMIT must be greater than 0".to_string(),
            ));
        }

        if self.max_completion_tokens == 0 {
            return Err(BotError::ConfigError(
                "HERALD_MAX_COMPLETION_TOKENS must be greater than 0".to_string(),
            ));
        }

        if self.completion_timeout.is_zero() {
            return Err(BotError::ConfigError(
                "HERALD_COMPLETION_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        for (name, emitter) in [
            ("HERALD_BROADCAST_INTERVAL_SECS", &self.broadcast),
            ("HERALD_FACT_INTERVAL_SECS", &self.facts),
        ] {
            if emitter.schedule.interval.is_zero() {
                return Err(BotError::ConfigError(format!("{name} must be greater than 0")));
            }
        }

        Ok(())
    }

    /// Settings for the completion wrapper
    pub fn fallback_settings(&self) -> FallbackSettings {
        FallbackSettings {
            model: self.openai_model.clone(),
            max_tokens: self.max_completion_tokens,
            timeout: self.completion_timeout,
            system_prompt: None,
            fallback_reply: self.fallback_reply.clone(),
        }
    }
}

fn parse_destinations(key: &str) -> Result<Vec<Destination>> {
    env_list(key).iter().map(|item| item.parse()).collect()
}

fn env_secs(key: &str, default: Duration) -> Result<Duration> {
    Ok(Duration::from_secs(env_or(key, default.as_secs())?))
}

/// Builder for HeraldConfig
#[derive(Debug, Default)]
pub struct HeraldConfigBuilder {
    config: HeraldConfig,
}

impl HeraldConfigBuilder {
    pub fn heroes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.heroes_path = path.into();
        self
    }

    pub fn prompts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.prompts_path = path.into();
        self
    }

    pub fn openai_model(mut self, model: impl Into<String>) -> Self {
        self.config.openai_model = model.into();
        self
    }

    pub fn session_ttl_secs(mut self, ttl: i64) -> Self {
        self.config.session_ttl_secs = ttl;
        self
    }

    pub fn search_history_limit(mut self, limit: usize) -> Self {
        self.config.search_history_limit = limit;
        self
    }

    pub fn completion_timeout(mut self, timeout: Duration) -> Self {
        self.config.completion_timeout = timeout;
        self
    }

    pub fn max_completion_tokens(mut self, tokens: usize) -> Self {
        self.config.max_completion_tokens = tokens;
        self
    }

    pub fn fallback_reply(mut self, reply: impl Into<String>) -> Self {
        self.config.fallback_reply = reply.into();
        self
    }

    pub fn broadcast_message(mut self, message: impl Into<String>) -> Self {
        self.config.broadcast_message = message.into();
        self
    }

    pub fn broadcast_destinations(mut self, destinations: Vec<Destination>) -> Self {
        self.config.broadcast.destinations = destinations;
        self
    }

    pub fn broadcast_schedule(mut self, schedule: Schedule) -> Self {
        self.config.broadcast.schedule = schedule;
        self
    }

    pub fn fact_destinations(mut self, destinations: Vec<Destination>) -> Self {
        self.config.facts.destinations = destinations;
        self
    }

    pub fn fact_schedule(mut self, schedule: Schedule) -> Self {
        self.config.facts.schedule = schedule;
        self
    }

    /// Override every field that has an environment variable set
    pub fn from_env(mut self) -> Result<Self> {
        let c = &mut self.config;

        c.heroes_path =
            env_string_or("HERALD_HEROES_PATH", &c.heroes_path.to_string_lossy()).into();
        c.prompts_path =
            env_string_or("HERALD_PROMPTS_PATH", &c.prompts_path.to_string_lossy()).into();
        c.openai_model = env_string_or("OPENAI_MODEL", &c.openai_model);
        c.session_ttl_secs = env_or("HERALD_SESSION_TTL_SECS", c.session_ttl_secs)?;
        c.search_history_limit = env_or("HERALD_SEARCH_HISTORY_LIMIT", c.search_history_limit)?;
        c.completion_timeout = env_secs("HERALD_COMPLETION_TIMEOUT_SECS", c.completion_timeout)?;
        c.max_completion_tokens = env_or("HERALD_MAX_COMPLETION_TOKENS", c.max_completion_tokens)?;
        c.fallback_reply = env_string_or("HERALD_FALLBACK_REPLY", &c.fallback_reply);
        c.broadcast_message = env_string_or("HERALD_BROADCAST_MESSAGE", &c.broadcast_message);

        c.broadcast.destinations = parse_destinations("HERALD_BROADCAST_CHATS")?;
        c.broadcast.schedule = Schedule::new(
            env_secs("HERALD_BROADCAST_INITIAL_DELAY_SECS", c.broadcast.schedule.initial_delay)?,
            env_secs("HERALD_BROADCAST_INTERVAL_SECS", c.broadcast.schedule.interval)?,
        );

        c.facts.destinations = parse_destinations("HERALD_FACT_CHATS")?;
        c.facts.schedule = Schedule::new(
            env_secs("HERALD_FACT_INITIAL_DELAY_SECS", c.facts.schedule.initial_delay)?,
            env_secs("HERALD_FACT_INTERVAL_SECS", c.facts.schedule.interval)?,
        );

        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<HeraldConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HeraldConfig::default();
        assert_eq!(config.session_ttl_secs, 3600);
        assert_eq!(config.search_history_limit, 20);
        assert_eq!(
            config.broadcast.schedule,
            Schedule::new(Duration::from_secs(60), Duration::from_secs(30))
        );
        assert_eq!(config.facts.schedule.interval, Duration::from_secs(86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = HeraldConfig::builder()
            .heroes_path("/srv/heroes.json")
            .search_history_limit(5)
            .max_completion_tokens(120)
            .broadcast_destinations(vec![Destination::new(1)])
            .build()
            .unwrap();

        assert_eq!(config.heroes_path, PathBuf::from("/srv/heroes.json"));
        assert_eq!(config.search_history_limit, 5);
        assert_eq!(config.fallback_settings().max_tokens, 120);
        assert_eq!(config.broadcast.destinations.len(), 1);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        assert!(HeraldConfig::builder().search_history_limit(0).build().is_err());
        assert!(HeraldConfig::builder().session_ttl_secs(0).build().is_err());
        assert!(
            HeraldConfig::builder()
                .completion_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
        assert!(
            HeraldConfig::builder()
                .fact_schedule(Schedule::new(Duration::ZERO, Duration::ZERO))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_from_env() {
        unsafe {
            std::env::set_var("HERALD_BROADCAST_CHATS", "123, -100200=Hello group");
            std::env::set_var("HERALD_BROADCAST_INTERVAL_SECS", "45");
            std::env::set_var("HERALD_SEARCH_HISTORY_LIMIT", "7");
        }

        let config = HeraldConfig::from_env().unwrap();
        assert_eq!(
            config.broadcast.destinations,
            vec![Destination::new(123), Destination::new(-100_200).with_text("Hello group")]
        );
        assert_eq!(config.broadcast.schedule.interval, Duration::from_secs(45));
        assert_eq!(config.search_history_limit, 7);

        unsafe {
            std::env::set_var("HERALD_SEARCH_HISTORY_LIMIT", "many");
        }
        assert!(matches!(HeraldConfig::from_env(), Err(BotError::ConfigError(_))));

        unsafe {
            std::env::remove_var("HERALD_BROADCAST_CHATS");
            std::env::remove_var("HERALD_BROADCAST_INTERVAL_SECS");
            std::env::remove_var("HERALD_SEARCH_HISTORY_LIMIT");
        }
    }
}
